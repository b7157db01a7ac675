use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("JSON encode failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("MessagePack encode failed: {0}")]
    MsgPack(#[from] rmp_serde::encode::Error),
}

/// Wire format for CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// MessagePack with named fields
    Msgpack,
}

impl OutputFormat {
    pub fn encode<T: Serialize>(self, value: &T) -> Result<Vec<u8>, CodecError> {
        match self {
            OutputFormat::Json => {
                let mut buf = serde_json::to_vec_pretty(value)?;
                buf.push(b'\n');
                Ok(buf)
            }
            OutputFormat::Msgpack => Ok(rmp_serde::to_vec_named(value)?),
        }
    }
}
