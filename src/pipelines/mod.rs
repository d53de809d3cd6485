pub use self::xmpm_pipeline::XmpmPipeline;

mod xmpm_pipeline;
