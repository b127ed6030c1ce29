//! Host communication settings (chapter 3 of the MS3 user manual).

use once_cell::sync::Lazy;

use crate::codec::{Fields, Grammar, Params, Setting, Slot, baud_rate_code, run_within};
use crate::error::Result;
use crate::wire_enum;

wire_enum! {
    /// parity of a serial port, shared by the host and auxiliary port settings
    pub enum Parity {
        None = b'0',
        Even = b'1',
        Odd = b'2',
    }
}

wire_enum! {
    /// stop bits of a serial port, shared by the host and auxiliary port settings
    pub enum StopBits {
        One = b'0',
        Two = b'1',
    }
}

wire_enum! {
    /// data bits of a serial port, shared by the host and auxiliary port settings
    pub enum DataBits {
        Seven = b'0',
        Eight = b'1',
    }
}

/// Host Port Connection, K100 (page 3-4)
///
/// The manual uses the plural "Host Port Connections" for this section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPortConnection {
    /// bits per second, one of the rates in [`crate::codec::BAUD_RATES`]
    pub baud_rate: u32,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub data_bits: DataBits,
}

impl Default for HostPortConnection {
    fn default() -> Self {
        HostPortConnection {
            baud_rate: 9600,
            parity: Parity::None,
            stop_bits: StopBits::One,
            data_bits: DataBits::Seven,
        }
    }
}

impl Setting for HostPortConnection {
    const CODE: &'static str = "K100";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
            Grammar::new(
                HostPortConnection::CODE,
                &[
                    Slot::baud_rate(),
                    Slot::choice::<Parity>(),
                    Slot::choice::<StopBits>(),
                    Slot::choice::<DataBits>(),
                ],
            )
        });
        &GRAMMAR
    }

    fn validate(&self) -> bool {
        baud_rate_code(self.baud_rate).is_some()
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new()
            .baud_rate(self.baud_rate)?
            .choice(self.parity)
            .choice(self.stop_bits)
            .choice(self.data_bits))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(HostPortConnection {
            baud_rate: fields.baud_rate()?,
            parity: fields.choice()?,
            stop_bits: fields.choice()?,
            data_bits: fields.choice()?,
        })
    }
}

wire_enum! {
    pub enum Protocol {
        PointToPoint = b'0',
        PointToPointWithRtsCts = b'1',
        PointToPointWithXonXoff = b'2',
        PointToPointWithRtsCtsAndXonXoff = b'3',
        PollingModeD = b'4',
        Multidrop = b'5',
        UserDefined = b'6',
        UserDefinedMultidrop = b'7',
    }
}

/// Host Protocol, K140 (page 3-5)
///
/// `Multidrop`, `UserDefined` and `UserDefinedMultidrop` carry further
/// parameters (pages 3-7 to 3-9). They are accepted on decode but not kept,
/// so such a fragment does not survive a decode/encode round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostProtocol {
    pub protocol: Protocol,
}

impl Default for HostProtocol {
    fn default() -> Self {
        HostProtocol {
            protocol: Protocol::PointToPoint,
        }
    }
}

impl Setting for HostProtocol {
    const CODE: &'static str = "K140";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
            Grammar::new(
                HostProtocol::CODE,
                &[Slot::choice::<Protocol>(), Slot::Trailing],
            )
        });
        &GRAMMAR
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new().choice(self.protocol))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(HostProtocol {
            protocol: fields.choice()?,
        })
    }
}

wire_enum! {
    pub enum Rs422Status {
        Disabled = b'0',
        Enabled = b'1',
    }
}

/// Host RS-232/422 Status, K102 (page 3-10)
///
/// Switches the host port between RS-232 and RS-422. Ignored by the device
/// when a multidrop protocol implies RS-485.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRs422Status {
    pub status: Rs422Status,
}

impl Default for HostRs422Status {
    fn default() -> Self {
        HostRs422Status {
            status: Rs422Status::Disabled,
        }
    }
}

impl Setting for HostRs422Status {
    const CODE: &'static str = "K102";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> =
            Lazy::new(|| Grammar::new(HostRs422Status::CODE, &[Slot::choice::<Rs422Status>()]));
        &GRAMMAR
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new().choice(self.status))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(HostRs422Status {
            status: fields.choice()?,
        })
    }
}

wire_enum! {
    pub enum AuxiliaryPortMode {
        Disabled = b'0',
        Transparent = b'1',
        HalfDuplex = b'2',
        FullDuplex = b'3',
        DaisyChain = b'4',
        CommandProcessing = b'5',
    }
}

wire_enum! {
    pub enum DaisyChainIdStatus {
        Disabled = b'0',
        Enabled = b'1',
    }
}

/// RS-232 Auxiliary Port, K101 (page 3-11)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rs232AuxiliaryPort {
    pub aux_port_mode: AuxiliaryPortMode,
    pub baud_rate: u32,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub data_bits: DataBits,
    pub daisy_chain_id_status: DaisyChainIdStatus,
    /// one or two characters
    pub daisy_chain_id: Option<Vec<u8>>,
}

impl Default for Rs232AuxiliaryPort {
    fn default() -> Self {
        Rs232AuxiliaryPort {
            aux_port_mode: AuxiliaryPortMode::Disabled,
            baud_rate: 9600,
            parity: Parity::None,
            stop_bits: StopBits::One,
            data_bits: DataBits::Seven,
            daisy_chain_id_status: DaisyChainIdStatus::Disabled,
            daisy_chain_id: Some(b"1/".to_vec()),
        }
    }
}

impl Setting for Rs232AuxiliaryPort {
    const CODE: &'static str = "K101";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
            Grammar::new(
                Rs232AuxiliaryPort::CODE,
                &[
                    Slot::choice::<AuxiliaryPortMode>(),
                    Slot::baud_rate(),
                    Slot::choice::<Parity>(),
                    Slot::choice::<StopBits>(),
                    Slot::choice::<DataBits>(),
                    Slot::choice::<DaisyChainIdStatus>(),
                    Slot::chars(1, 2).optional(),
                ],
            )
        });
        &GRAMMAR
    }

    fn validate(&self) -> bool {
        baud_rate_code(self.baud_rate).is_some() && run_within(&self.daisy_chain_id, 1, 2)
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new()
            .choice(self.aux_port_mode)
            .baud_rate(self.baud_rate)?
            .choice(self.parity)
            .choice(self.stop_bits)
            .choice(self.data_bits)
            .choice(self.daisy_chain_id_status)
            .chars(self.daisy_chain_id.as_deref()))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(Rs232AuxiliaryPort {
            aux_port_mode: fields.choice()?,
            baud_rate: fields.baud_rate()?,
            parity: fields.choice()?,
            stop_bits: fields.choice()?,
            data_bits: fields.choice()?,
            daisy_chain_id_status: fields.choice()?,
            daisy_chain_id: fields.chars(),
        })
    }
}

wire_enum! {
    pub enum PreambleStatus {
        Disabled = b'0',
        Enabled = b'1',
    }
}

/// Preamble, K141 (page 3-20)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preamble {
    pub status: PreambleStatus,
    /// up to four characters sent ahead of every symbol
    pub characters: Option<Vec<u8>>,
}

impl Default for Preamble {
    fn default() -> Self {
        Preamble {
            status: PreambleStatus::Disabled,
            characters: None,
        }
    }
}

impl Setting for Preamble {
    const CODE: &'static str = "K141";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
            Grammar::new(
                Preamble::CODE,
                &[Slot::choice::<PreambleStatus>(), Slot::chars(1, 4).optional()],
            )
        });
        &GRAMMAR
    }

    fn validate(&self) -> bool {
        run_within(&self.characters, 1, 4)
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new()
            .choice(self.status)
            .chars(self.characters.as_deref()))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(Preamble {
            status: fields.choice()?,
            characters: fields.chars(),
        })
    }
}

wire_enum! {
    pub enum PostambleStatus {
        Disabled = b'0',
        Enabled = b'1',
    }
}

/// Postamble, K142 (page 3-20)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Postamble {
    pub status: PostambleStatus,
    /// up to four characters sent after every symbol
    pub characters: Option<Vec<u8>>,
}

impl Default for Postamble {
    fn default() -> Self {
        Postamble {
            status: PostambleStatus::Disabled,
            characters: None,
        }
    }
}

impl Setting for Postamble {
    const CODE: &'static str = "K142";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
            Grammar::new(
                Postamble::CODE,
                &[Slot::choice::<PostambleStatus>(), Slot::chars(1, 4).optional()],
            )
        });
        &GRAMMAR
    }

    fn validate(&self) -> bool {
        run_within(&self.characters, 1, 4)
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new()
            .choice(self.status)
            .chars(self.characters.as_deref()))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(Postamble {
            status: fields.choice()?,
            characters: fields.chars(),
        })
    }
}

wire_enum! {
    pub enum LrcStatus {
        Disabled = b'0',
        Enabled = b'1',
    }
}

/// LRC Status, K145 (page 3-22)
///
/// Longitudinal redundancy check appended to the symbol output. Named `Lrc`
/// to keep it apart from the [`LrcStatus`] enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lrc {
    pub status: LrcStatus,
}

impl Default for Lrc {
    fn default() -> Self {
        Lrc {
            status: LrcStatus::Disabled,
        }
    }
}

impl Setting for Lrc {
    const CODE: &'static str = "K145";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> =
            Lazy::new(|| Grammar::new(Lrc::CODE, &[Slot::choice::<LrcStatus>()]));
        &GRAMMAR
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new().choice(self.status))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(Lrc {
            status: fields.choice()?,
        })
    }
}

/// Intercharacter Delay, K144 (page 3-22)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterCharacterDelay {
    /// milliseconds between two output characters
    pub delay: u8,
}

impl Setting for InterCharacterDelay {
    const CODE: &'static str = "K144";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> =
            Lazy::new(|| Grammar::new(InterCharacterDelay::CODE, &[Slot::digits(1, 3)]));
        &GRAMMAR
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new().number(self.delay))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(InterCharacterDelay {
            delay: fields.number()?,
        })
    }
}
