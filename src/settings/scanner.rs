//! Scanner and laser settings (chapter 4 of the MS3 user manual).
//!
//! The manual lists scan speed, scanner setup and symbol detect under one
//! "Scanner Setup" heading. They are kept apart here as the device stores
//! them under distinct K-codes.

use once_cell::sync::Lazy;

use crate::codec::{Fields, Grammar, Params, Setting, Slot};
use crate::error::Result;
use crate::wire_enum;

/// Scan Speed, K500 (page 4-17)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSpeed {
    /// scans per second
    pub speed: u16,
}

impl Default for ScanSpeed {
    fn default() -> Self {
        ScanSpeed { speed: 350 }
    }
}

impl Setting for ScanSpeed {
    const CODE: &'static str = "K500";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> =
            Lazy::new(|| Grammar::new(ScanSpeed::CODE, &[Slot::digits(2, 3)]));
        &GRAMMAR
    }

    fn validate(&self) -> bool {
        (30..=999).contains(&self.speed)
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new().number(self.speed))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(ScanSpeed {
            speed: fields.number()?,
        })
    }
}

wire_enum! {
    pub enum AgcSamplingMode {
        Disabled = b'0',
        LeadingEdge = b'1',
        Continuous = b'2',
    }
}

/// Scanner Setup, K504 (page 4-17)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerSetup {
    pub gain_level: u16,
    pub agc_sampling_mode: AgcSamplingMode,
    /// lower bound of the automatic gain control, 40 to 250
    pub agc_min: Option<u8>,
    /// upper bound of the automatic gain control, 60 to 255
    pub agc_max: Option<u8>,
}

impl Default for ScannerSetup {
    fn default() -> Self {
        ScannerSetup {
            gain_level: 350,
            agc_sampling_mode: AgcSamplingMode::Continuous,
            agc_min: Some(70),
            agc_max: Some(245),
        }
    }
}

impl Setting for ScannerSetup {
    const CODE: &'static str = "K504";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
            Grammar::new(
                ScannerSetup::CODE,
                &[
                    Slot::digits(2, 3),
                    Slot::choice::<AgcSamplingMode>(),
                    Slot::digits(2, 3).optional(),
                    Slot::digits(2, 3).optional(),
                ],
            )
        });
        &GRAMMAR
    }

    fn validate(&self) -> bool {
        self.gain_level >= 40
            && self.agc_min.is_none_or(|min| (40..=250).contains(&min))
            && self.agc_max.is_none_or(|max| max >= 60)
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new()
            .number(self.gain_level)
            .choice(self.agc_sampling_mode)
            .optional_number(self.agc_min)
            .optional_number(self.agc_max))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(ScannerSetup {
            gain_level: fields.number()?,
            agc_sampling_mode: fields.choice()?,
            agc_min: fields.optional_number()?,
            agc_max: fields.optional_number()?,
        })
    }
}

wire_enum! {
    pub enum SymbolDetectStatus {
        Disabled = b'0',
        Enabled = b'1',
    }
}

/// Symbol Detect Status, K505 (page 4-19)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolDetect {
    pub status: SymbolDetectStatus,
    pub transition_counter: Option<u8>,
}

impl Default for SymbolDetect {
    fn default() -> Self {
        SymbolDetect {
            status: SymbolDetectStatus::Disabled,
            transition_counter: Some(14),
        }
    }
}

impl Setting for SymbolDetect {
    const CODE: &'static str = "K505";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
            Grammar::new(
                SymbolDetect::CODE,
                &[
                    Slot::choice::<SymbolDetectStatus>(),
                    Slot::digits(1, 3).optional(),
                ],
            )
        });
        &GRAMMAR
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new()
            .choice(self.status)
            .optional_number(self.transition_counter))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(SymbolDetect {
            status: fields.choice()?,
            transition_counter: fields.optional_number()?,
        })
    }
}

/// Maximum Element, K502 (page 4-20)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MaximumElement {
    pub value: u16,
}

impl Setting for MaximumElement {
    const CODE: &'static str = "K502";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> =
            Lazy::new(|| Grammar::new(MaximumElement::CODE, &[Slot::digits(1, 5)]));
        &GRAMMAR
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new().number(self.value))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(MaximumElement {
            value: fields.number()?,
        })
    }
}

wire_enum! {
    pub enum ScanWidthEnhanceStatus {
        Disabled = b'0',
        Enabled = b'1',
    }
}

/// Scan Width Enhance, K511 (page 4-20)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanWidthEnhance {
    pub status: ScanWidthEnhanceStatus,
}

impl Default for ScanWidthEnhance {
    fn default() -> Self {
        ScanWidthEnhance {
            status: ScanWidthEnhanceStatus::Disabled,
        }
    }
}

impl Setting for ScanWidthEnhance {
    const CODE: &'static str = "K511";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
            Grammar::new(
                ScanWidthEnhance::CODE,
                &[Slot::choice::<ScanWidthEnhanceStatus>()],
            )
        });
        &GRAMMAR
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new().choice(self.status))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(ScanWidthEnhance {
            status: fields.choice()?,
        })
    }
}

wire_enum! {
    pub enum LaserOnOffStatus {
        Disabled = b'0',
        Enabled = b'1',
    }
}

wire_enum! {
    pub enum LaserFramingStatus {
        Disabled = b'0',
        Enabled = b'1',
    }
}

wire_enum! {
    pub enum LaserPower {
        Low = b'0',
        Medium = b'1',
        High = b'2',
    }
}

/// Laser Setup, K700 (page 4-20)
///
/// Laser power is documented twice in the manual, once here and once under
/// "Scanner Setup". The device stores it with K700 only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaserSetup {
    pub on_off_status: LaserOnOffStatus,
    pub framing_status: LaserFramingStatus,
    /// percentage of the scan line where the laser turns on, 10 to 80
    pub on_position: u8,
    /// percentage of the scan line where the laser turns off, 20 to 95
    pub off_position: u8,
    pub power: LaserPower,
}

impl Default for LaserSetup {
    fn default() -> Self {
        LaserSetup {
            on_off_status: LaserOnOffStatus::Enabled,
            framing_status: LaserFramingStatus::Enabled,
            on_position: 10,
            off_position: 95,
            power: LaserPower::High,
        }
    }
}

impl Setting for LaserSetup {
    const CODE: &'static str = "K700";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
            Grammar::new(
                LaserSetup::CODE,
                &[
                    Slot::choice::<LaserOnOffStatus>(),
                    Slot::choice::<LaserFramingStatus>(),
                    Slot::digits(2, 2),
                    Slot::digits(2, 2),
                    Slot::choice::<LaserPower>(),
                ],
            )
        });
        &GRAMMAR
    }

    fn validate(&self) -> bool {
        (10..=80).contains(&self.on_position) && (20..=95).contains(&self.off_position)
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new()
            .choice(self.on_off_status)
            .choice(self.framing_status)
            .number(self.on_position)
            .number(self.off_position)
            .choice(self.power))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(LaserSetup {
            on_off_status: fields.choice()?,
            framing_status: fields.choice()?,
            on_position: fields.number()?,
            off_position: fields.number()?,
            power: fields.choice()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_scan_speed() -> Result<()> {
        assert_eq!(ScanSpeed::decode(b"<K500,350>")?.speed, 350);
        assert_eq!(ScanSpeed::default().encode()?, b"<K500,350>".to_vec());
        assert_eq!(ScanSpeed { speed: 30 }.encode()?, b"<K500,30>".to_vec());
        assert!(ScanSpeed { speed: 29 }.encode().is_err());
        assert!(ScanSpeed::decode(b"<K500,3>").is_err());
        assert!(ScanSpeed::decode(b"<K500,1000>").is_err());
        Ok(())
    }

    #[test]
    fn test_scanner_setup() -> Result<()> {
        let setting = ScannerSetup::decode(b"<K504,50,2,60,230>")?;
        assert_eq!(setting.gain_level, 50);
        assert_eq!(setting.agc_sampling_mode, AgcSamplingMode::Continuous);
        assert_eq!(setting.agc_min, Some(60));
        assert_eq!(setting.agc_max, Some(230));

        let setting = ScannerSetup {
            gain_level: 90,
            agc_sampling_mode: AgcSamplingMode::Disabled,
            agc_min: None,
            agc_max: None,
        };
        assert_eq!(setting.encode()?, b"<K504,90,0,,>".to_vec());
        assert_eq!(ScannerSetup::decode(b"<K504,90,0,,>")?, setting);

        assert_eq!(ScannerSetup::default().encode()?, b"<K504,350,2,70,245>".to_vec());

        let out_of_range = ScannerSetup {
            agc_min: Some(30),
            ..Default::default()
        };
        assert!(matches!(
            out_of_range.encode(),
            Err(Error::EncodingInvariantViolation { code: "K504", .. })
        ));
        Ok(())
    }

    #[test]
    fn test_symbol_detect() -> Result<()> {
        let setting = SymbolDetect::decode(b"<K505,0,>")?;
        assert_eq!(setting.status, SymbolDetectStatus::Disabled);
        assert_eq!(setting.transition_counter, None);
        assert_eq!(setting.encode()?, b"<K505,0,>".to_vec());
        assert_eq!(SymbolDetect::default().encode()?, b"<K505,0,14>".to_vec());
        Ok(())
    }

    #[test]
    fn test_maximum_element_and_scan_width_enhance() -> Result<()> {
        assert_eq!(MaximumElement::decode(b"<K502,65535>")?.value, 65535);
        assert_eq!(MaximumElement::default().encode()?, b"<K502,0>".to_vec());
        assert!(MaximumElement::decode(b"<K502,65536>").is_err());

        assert_eq!(
            ScanWidthEnhance::decode(b"<K511,1>")?.status,
            ScanWidthEnhanceStatus::Enabled
        );
        assert!(ScanWidthEnhance::decode(b"<K511,2>").is_err());
        Ok(())
    }

    #[test]
    fn test_laser_setup() -> Result<()> {
        let setting = LaserSetup::decode(b"<K700,1,1,10,95,1>")?;
        assert_eq!(setting.on_position, 10);
        assert_eq!(setting.off_position, 95);
        assert_eq!(setting.power, LaserPower::Medium);
        assert_eq!(LaserSetup::default().encode()?, b"<K700,1,1,10,95,2>".to_vec());

        let too_early = LaserSetup {
            on_position: 5,
            ..Default::default()
        };
        assert!(too_early.encode().is_err());
        assert!(LaserSetup::decode(b"<K700,1,1,5,95,1>").is_err());
        Ok(())
    }
}
