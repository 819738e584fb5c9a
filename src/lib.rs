pub mod classes;
pub mod client;
pub mod gateway;
pub mod server;
pub mod tensor;

/// Gateway configuration -- can eventually be lazy_static parsed from a config
/// file
pub mod config {
    /// Default log filter installed by the binary
    pub const RUST_LOG: &str = "info,infergate=debug";

    /// Side length the model expects; uploads are resized to this square
    pub const INPUT_SIDE: u32 = 224;

    /// Name of the model's input tensor
    pub const TENSOR_NAME: &str = "input";

    /// Datatype tag sent on the wire
    pub const TENSOR_DATATYPE: &str = "FP32";

    /// Upload ceiling enforced before any processing
    pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

    /// Where stored uploads land, served back under `/uploads`
    pub const UPLOAD_DIR: &str = "static/uploads";

    /// Deadline on the outbound inference call, in seconds
    pub const PREDICT_TIMEOUT_SECS: u64 = 30;
}
