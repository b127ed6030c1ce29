//! Read cycle settings (chapter 4 of the MS3 user manual).

use once_cell::sync::Lazy;

use crate::codec::{Fields, Grammar, Params, Setting, Slot, run_within};
use crate::error::Result;
use crate::wire_enum;

/// Multisymbol, K222 (page 4-3)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multisymbol {
    /// symbols read in one read cycle, 1 to 5
    pub number_of_symbols: u8,
    /// single character placed between the symbols of one read cycle
    pub separator: Option<Vec<u8>>,
}

impl Default for Multisymbol {
    fn default() -> Self {
        Multisymbol {
            number_of_symbols: 1,
            separator: Some(b",".to_vec()),
        }
    }
}

impl Setting for Multisymbol {
    const CODE: &'static str = "K222";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
            Grammar::new(
                Multisymbol::CODE,
                &[Slot::digit(1, 5), Slot::chars(1, 1).optional()],
            )
        });
        &GRAMMAR
    }

    fn validate(&self) -> bool {
        (1..=5).contains(&self.number_of_symbols) && run_within(&self.separator, 1, 1)
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new()
            .number(self.number_of_symbols)
            .chars(self.separator.as_deref()))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(Multisymbol {
            number_of_symbols: fields.number()?,
            separator: fields.chars(),
        })
    }
}

wire_enum! {
    pub enum TriggerMode {
        ContinuousRead = b'0',
        ContinuousReadOneOutput = b'1',
        ExternalLevel = b'2',
        ExternalEdge = b'3',
        SerialData = b'4',
        SerialDataAndExternalEdge = b'5',
    }
}

impl TriggerMode {
    /// true for the modes in which a read cycle starts on a serial trigger
    pub fn is_serial(self) -> bool {
        matches!(
            self,
            TriggerMode::SerialData | TriggerMode::SerialDataAndExternalEdge
        )
    }
}

/// Trigger, K200 (page 4-6)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub mode: TriggerMode,
    /// filter duration of the external trigger input
    pub filter_duration: u16,
}

impl Default for Trigger {
    fn default() -> Self {
        Trigger {
            mode: TriggerMode::ContinuousRead,
            filter_duration: 244,
        }
    }
}

impl Setting for Trigger {
    const CODE: &'static str = "K200";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
            Grammar::new(
                Trigger::CODE,
                &[Slot::choice::<TriggerMode>(), Slot::digits(1, 5)],
            )
        });
        &GRAMMAR
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new()
            .choice(self.mode)
            .number(self.filter_duration))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(Trigger {
            mode: fields.choice()?,
            filter_duration: fields.number()?,
        })
    }
}

wire_enum! {
    pub enum ExternalTriggerState {
        Negative = b'0',
        Positive = b'1',
    }
}

/// External Trigger Status, K202 (page 4-11)
///
/// Named `ExternalTrigger` to keep it apart from the
/// [`ExternalTriggerState`] enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTrigger {
    pub state: ExternalTriggerState,
}

impl Default for ExternalTrigger {
    fn default() -> Self {
        ExternalTrigger {
            state: ExternalTriggerState::Positive,
        }
    }
}

impl Setting for ExternalTrigger {
    const CODE: &'static str = "K202";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
            Grammar::new(
                ExternalTrigger::CODE,
                &[Slot::choice::<ExternalTriggerState>()],
            )
        });
        &GRAMMAR
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new().choice(self.state))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(ExternalTrigger {
            state: fields.choice()?,
        })
    }
}

/// Serial Trigger, K201 (page 4-12)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialTrigger {
    /// character that starts a read cycle when sent wrapped as `<c>`
    pub character: Option<Vec<u8>>,
}

impl Default for SerialTrigger {
    fn default() -> Self {
        SerialTrigger {
            character: Some(b"^".to_vec()),
        }
    }
}

impl Setting for SerialTrigger {
    const CODE: &'static str = "K201";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
            Grammar::new(SerialTrigger::CODE, &[Slot::chars(1, 1).optional()])
        });
        &GRAMMAR
    }

    fn validate(&self) -> bool {
        run_within(&self.character, 1, 1)
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new().chars(self.character.as_deref()))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(SerialTrigger {
            character: fields.chars(),
        })
    }
}

/// Non-delimited Start Character, K229 (page 4-13)
///
/// The character travels as two hex digits rather than as itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StartTriggerCharacter {
    pub character: Option<u8>,
}

impl Setting for StartTriggerCharacter {
    const CODE: &'static str = "K229";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
            Grammar::new(StartTriggerCharacter::CODE, &[Slot::hex_byte().optional()])
        });
        &GRAMMAR
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new().hex_byte(self.character))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(StartTriggerCharacter {
            character: fields.hex_byte()?,
        })
    }
}

/// Non-delimited Stop Character, K230 (page 4-13)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StopTriggerCharacter {
    pub character: Option<u8>,
}

impl Setting for StopTriggerCharacter {
    const CODE: &'static str = "K230";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
            Grammar::new(StopTriggerCharacter::CODE, &[Slot::hex_byte().optional()])
        });
        &GRAMMAR
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new().hex_byte(self.character))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(StopTriggerCharacter {
            character: fields.hex_byte()?,
        })
    }
}

wire_enum! {
    pub enum EndReadCycleMode {
        Timeout = b'0',
        NewTrigger = b'1',
        TimeoutAndNewTrigger = b'2',
    }
}

/// End Read Cycle, K220 (page 4-14)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndReadCycle {
    pub mode: EndReadCycleMode,
    /// read cycle timeout in tens of milliseconds, 100 is one second
    pub timeout: u16,
}

impl Default for EndReadCycle {
    fn default() -> Self {
        EndReadCycle {
            mode: EndReadCycleMode::Timeout,
            timeout: 100,
        }
    }
}

impl Setting for EndReadCycle {
    const CODE: &'static str = "K220";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
            Grammar::new(
                EndReadCycle::CODE,
                &[Slot::choice::<EndReadCycleMode>(), Slot::digits(1, 5)],
            )
        });
        &GRAMMAR
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new().choice(self.mode).number(self.timeout))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(EndReadCycle {
            mode: fields.choice()?,
            timeout: fields.number()?,
        })
    }
}

wire_enum! {
    pub enum DecodesBeforeOutputMode {
        NonConsecutive = b'0',
        Consecutive = b'1',
    }
}

/// Decodes Before Output, K221 (page 4-16)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodesBeforeOutput {
    /// matching decodes required before a symbol is output, 1 to 255
    pub number: u8,
    pub mode: DecodesBeforeOutputMode,
}

impl Default for DecodesBeforeOutput {
    fn default() -> Self {
        DecodesBeforeOutput {
            number: 1,
            mode: DecodesBeforeOutputMode::NonConsecutive,
        }
    }
}

impl Setting for DecodesBeforeOutput {
    const CODE: &'static str = "K221";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
            Grammar::new(
                DecodesBeforeOutput::CODE,
                &[Slot::digits(1, 3), Slot::choice::<DecodesBeforeOutputMode>()],
            )
        });
        &GRAMMAR
    }

    fn validate(&self) -> bool {
        self.number >= 1
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new().number(self.number).choice(self.mode))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(DecodesBeforeOutput {
            number: fields.number()?,
            mode: fields.choice()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_multisymbol() -> Result<()> {
        let setting = Multisymbol::decode(b"<K222,2,|>")?;
        assert_eq!(setting.number_of_symbols, 2);
        assert_eq!(setting.separator, Some(b"|".to_vec()));

        let setting = Multisymbol::decode(b"<K222,1,>")?;
        assert_eq!(setting.separator, None);
        assert_eq!(setting.encode()?, b"<K222,1,>".to_vec());

        assert_eq!(Multisymbol::default().encode()?, b"<K222,1,,>".to_vec());
        assert!(Multisymbol::decode(b"<K222,6,,>").is_err());

        let too_many = Multisymbol {
            number_of_symbols: 6,
            ..Default::default()
        };
        assert!(matches!(
            too_many.encode(),
            Err(Error::EncodingInvariantViolation { code: "K222", .. })
        ));
        Ok(())
    }

    #[test]
    fn test_trigger() -> Result<()> {
        let setting = Trigger::decode(b"<K200,3,9999>")?;
        assert_eq!(setting.mode, TriggerMode::ExternalEdge);
        assert_eq!(setting.filter_duration, 9999);
        assert!(!setting.mode.is_serial());

        let setting = Trigger::decode(b"<K200,5,1>")?;
        assert!(setting.mode.is_serial());

        assert_eq!(Trigger::default().encode()?, b"<K200,0,244>".to_vec());
        assert!(Trigger::decode(b"<K200,6,244>").is_err());
        assert!(Trigger::decode(b"<K200,1,>").is_err());
        assert!(Trigger::decode(b"<K200,1,99999>").is_err());
        Ok(())
    }

    #[test]
    fn test_external_trigger() -> Result<()> {
        assert_eq!(
            ExternalTrigger::decode(b"<K202,0>")?.state,
            ExternalTriggerState::Negative
        );
        assert_eq!(ExternalTrigger::default().encode()?, b"<K202,1>".to_vec());
        Ok(())
    }

    #[test]
    fn test_serial_trigger() -> Result<()> {
        assert_eq!(SerialTrigger::default().encode()?, b"<K201,^>".to_vec());
        assert_eq!(
            SerialTrigger::decode(b"<K201,^]>")?.character,
            Some(b"^]".to_vec())
        );
        assert_eq!(SerialTrigger::decode(b"<K201,>")?.character, None);
        assert!(SerialTrigger::decode(b"<K201,ab>").is_err());
        Ok(())
    }

    #[test]
    fn test_start_and_stop_trigger_character() -> Result<()> {
        assert_eq!(
            StartTriggerCharacter::decode(b"<K229,01>")?.character,
            Some(0x01)
        );
        assert_eq!(StartTriggerCharacter::decode(b"<K229,>")?.character, None);
        assert_eq!(
            StopTriggerCharacter { character: Some(0x1B) }.encode()?,
            b"<K230,1B>".to_vec()
        );
        assert_eq!(
            StopTriggerCharacter::decode(b"<K230,fe>")?.character,
            Some(0xFE)
        );
        assert!(StartTriggerCharacter::decode(b"<K229,1>").is_err());
        assert!(StartTriggerCharacter::decode(b"<K229,GG>").is_err());
        Ok(())
    }

    #[test]
    fn test_end_read_cycle() -> Result<()> {
        let setting = EndReadCycle::decode(b"<K220,1,100>")?;
        assert_eq!(setting.mode, EndReadCycleMode::NewTrigger);
        assert_eq!(setting.timeout, 100);
        assert_eq!(
            EndReadCycle {
                mode: EndReadCycleMode::TimeoutAndNewTrigger,
                timeout: 65535,
            }
            .encode()?,
            b"<K220,2,65535>".to_vec()
        );
        assert!(EndReadCycle::decode(b"<K220,3,100>").is_err());
        Ok(())
    }

    #[test]
    fn test_decodes_before_output() -> Result<()> {
        let setting = DecodesBeforeOutput::decode(b"<K221,10,1>")?;
        assert_eq!(setting.number, 10);
        assert_eq!(setting.mode, DecodesBeforeOutputMode::Consecutive);
        assert_eq!(DecodesBeforeOutput::default().encode()?, b"<K221,1,0>".to_vec());

        let zero = DecodesBeforeOutput {
            number: 0,
            ..Default::default()
        };
        assert!(zero.encode().is_err());
        assert!(DecodesBeforeOutput::decode(b"<K221,256,0>").is_err());
        Ok(())
    }
}
