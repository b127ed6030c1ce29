use thiserror::Error;

/// errors raised by the configuration codec and the reader session
#[derive(Debug, Error)]
pub enum Error {
    /// the parameters of a `<Kxxx,...>` fragment do not fit the grammar of its setting
    #[error("cannot decode config string {fragment} for K-code {code}")]
    MalformedConfigString { code: &'static str, fragment: String },

    /// no setting is registered for the identifier of a fragment
    #[error("no setting is registered for {0}")]
    UnknownSettingIdentifier(String),

    /// encoding a setting produced a fragment its own grammar rejects
    #[error("encoding the {code} setting resulted in an invalid K-string: {fragment}")]
    EncodingInvariantViolation { code: &'static str, fragment: String },

    /// baud rate (or its wire digit) is not part of the device baud rate table
    #[error("{0} is not a supported baud rate")]
    UnknownBaudRate(String),

    /// a configuration write was requested before any configuration was read or set
    #[error("no configuration has been read from or set for the device")]
    NoConfigurationLoaded,

    /// failure at the byte stream boundary, passed through unmodified
    #[error(transparent)]
    Transport(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn malformed(code: &'static str, fragment: &[u8]) -> Self {
        Self::MalformedConfigString {
            code,
            fragment: String::from_utf8_lossy(fragment).into_owned(),
        }
    }

    /// true when the error originates from the transport rather than the codec
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
