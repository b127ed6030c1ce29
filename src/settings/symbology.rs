//! Symbology settings (chapter 5 of the MS3 user manual).
//!
//! Interleaved 2 of 5 (K472), Codabar (K471) and Pharmacode are documented by
//! the manual but have no setting here yet.

use once_cell::sync::Lazy;

use crate::codec::{Fields, Grammar, Params, Setting, Slot, run_within};
use crate::error::Result;
use crate::wire_enum;

wire_enum! {
    pub enum Code39Status {
        Disabled = b'0',
        Enabled = b'1',
    }
}

wire_enum! {
    pub enum CheckDigitStatus {
        Disabled = b'0',
        Enabled = b'1',
    }
}

wire_enum! {
    pub enum CheckDigitOutputStatus {
        Disabled = b'0',
        Enabled = b'1',
    }
}

wire_enum! {
    pub enum LargeInterCharacterStatus {
        Disabled = b'0',
        Enabled = b'1',
    }
}

wire_enum! {
    /// shared by the Code 39, Code 128 and Code 93 settings
    pub enum FixedSymbolLengthStatus {
        Disabled = b'0',
        Enabled = b'1',
    }
}

wire_enum! {
    pub enum FullAsciiSetStatus {
        Disabled = b'0',
        Enabled = b'1',
    }
}

/// Code 39, K470 (page 5-3)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code39 {
    pub status: Code39Status,
    pub check_digit_status: CheckDigitStatus,
    pub check_digit_output: CheckDigitOutputStatus,
    pub large_intercharacter_gap: LargeInterCharacterStatus,
    pub fixed_symbol_length: FixedSymbolLengthStatus,
    /// 1 to 64
    pub symbol_length: u8,
    pub full_ascii_set: FullAsciiSetStatus,
}

impl Default for Code39 {
    fn default() -> Self {
        Code39 {
            status: Code39Status::Enabled,
            check_digit_status: CheckDigitStatus::Disabled,
            check_digit_output: CheckDigitOutputStatus::Disabled,
            large_intercharacter_gap: LargeInterCharacterStatus::Disabled,
            fixed_symbol_length: FixedSymbolLengthStatus::Disabled,
            symbol_length: 10,
            full_ascii_set: FullAsciiSetStatus::Disabled,
        }
    }
}

impl Setting for Code39 {
    const CODE: &'static str = "K470";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
            Grammar::new(
                Code39::CODE,
                &[
                    Slot::choice::<Code39Status>(),
                    Slot::choice::<CheckDigitStatus>(),
                    Slot::choice::<CheckDigitOutputStatus>(),
                    Slot::choice::<LargeInterCharacterStatus>(),
                    Slot::choice::<FixedSymbolLengthStatus>(),
                    Slot::digits(1, 2),
                    Slot::choice::<FullAsciiSetStatus>(),
                ],
            )
        });
        &GRAMMAR
    }

    fn validate(&self) -> bool {
        (1..=64).contains(&self.symbol_length)
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new()
            .choice(self.status)
            .choice(self.check_digit_status)
            .choice(self.check_digit_output)
            .choice(self.large_intercharacter_gap)
            .choice(self.fixed_symbol_length)
            .number(self.symbol_length)
            .choice(self.full_ascii_set))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(Code39 {
            status: fields.choice()?,
            check_digit_status: fields.choice()?,
            check_digit_output: fields.choice()?,
            large_intercharacter_gap: fields.choice()?,
            fixed_symbol_length: fields.choice()?,
            symbol_length: fields.number()?,
            full_ascii_set: fields.choice()?,
        })
    }
}

wire_enum! {
    pub enum Code128Status {
        Disabled = b'0',
        Enabled = b'1',
    }
}

wire_enum! {
    /// EAN-128 is Code 128 with a leading function 1 character
    pub enum Ean128Status {
        Disabled = b'0',
        Enabled = b'1',
        /// only EAN-128 symbols are decoded
        Required = b'2',
    }
}

wire_enum! {
    pub enum Code128OutputFormat {
        Standard = b'0',
        /// EAN-128 output split into application identifier records
        ApplicationRecord = b'1',
    }
}

wire_enum! {
    pub enum ApplicationRecordSeparatorStatus {
        Disabled = b'0',
        Enabled = b'1',
    }
}

wire_enum! {
    pub enum ApplicationRecordBrackets {
        Disabled = b'0',
        Enabled = b'1',
    }
}

wire_enum! {
    pub enum ApplicationRecordPadding {
        Disabled = b'0',
        Enabled = b'1',
    }
}

/// Code 128 and EAN-128, K474 (page 5-6)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code128 {
    pub status: Code128Status,
    pub fixed_symbol_length_status: FixedSymbolLengthStatus,
    /// 1 to 64
    pub symbol_length: u8,
    pub ean128_status: Ean128Status,
    pub output_format: Code128OutputFormat,
    pub application_record_separator_status: ApplicationRecordSeparatorStatus,
    pub application_record_separator_character: Option<Vec<u8>>,
    pub application_record_brackets: ApplicationRecordBrackets,
    pub application_record_padding: ApplicationRecordPadding,
}

impl Default for Code128 {
    fn default() -> Self {
        Code128 {
            status: Code128Status::Disabled,
            fixed_symbol_length_status: FixedSymbolLengthStatus::Disabled,
            symbol_length: 10,
            ean128_status: Ean128Status::Disabled,
            output_format: Code128OutputFormat::Standard,
            application_record_separator_status: ApplicationRecordSeparatorStatus::Disabled,
            application_record_separator_character: Some(b",".to_vec()),
            application_record_brackets: ApplicationRecordBrackets::Disabled,
            application_record_padding: ApplicationRecordPadding::Disabled,
        }
    }
}

impl Setting for Code128 {
    const CODE: &'static str = "K474";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
            Grammar::new(
                Code128::CODE,
                &[
                    Slot::choice::<Code128Status>(),
                    Slot::choice::<FixedSymbolLengthStatus>(),
                    Slot::digits(1, 2),
                    Slot::choice::<Ean128Status>(),
                    Slot::choice::<Code128OutputFormat>(),
                    Slot::choice::<ApplicationRecordSeparatorStatus>(),
                    Slot::chars(1, 1).optional(),
                    Slot::choice::<ApplicationRecordBrackets>(),
                    Slot::choice::<ApplicationRecordPadding>(),
                ],
            )
        });
        &GRAMMAR
    }

    fn validate(&self) -> bool {
        (1..=64).contains(&self.symbol_length)
            && run_within(&self.application_record_separator_character, 1, 1)
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new()
            .choice(self.status)
            .choice(self.fixed_symbol_length_status)
            .number(self.symbol_length)
            .choice(self.ean128_status)
            .choice(self.output_format)
            .choice(self.application_record_separator_status)
            .chars(self.application_record_separator_character.as_deref())
            .choice(self.application_record_brackets)
            .choice(self.application_record_padding))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(Code128 {
            status: fields.choice()?,
            fixed_symbol_length_status: fields.choice()?,
            symbol_length: fields.number()?,
            ean128_status: fields.choice()?,
            output_format: fields.choice()?,
            application_record_separator_status: fields.choice()?,
            application_record_separator_character: fields.chars(),
            application_record_brackets: fields.choice()?,
            application_record_padding: fields.choice()?,
        })
    }
}

wire_enum! {
    pub enum UpcStatus {
        Disabled = b'0',
        Enabled = b'1',
    }
}

wire_enum! {
    pub enum EanStatus {
        Disabled = b'0',
        Enabled = b'1',
    }
}

wire_enum! {
    pub enum SupplementalsStatus {
        Disabled = b'0',
        Enabled = b'1',
        Required = b'2',
    }
}

wire_enum! {
    pub enum SeparatorStatus {
        Disabled = b'0',
        Enabled = b'1',
    }
}

wire_enum! {
    pub enum UpcEOutputAsUpcA {
        Disabled = b'0',
        Enabled = b'1',
    }
}

/// UPC/EAN, K473 (page 5-16)
///
/// The device reports an unused parameter between the separator character
/// and the UPC-E expansion, which is always sent empty. The last parameter is
/// not documented by the manual and is passed through as a single digit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcEan {
    pub upc_status: UpcStatus,
    pub ean_status: EanStatus,
    pub supplementals_status: SupplementalsStatus,
    pub separator_status: SeparatorStatus,
    pub separator_character: Option<Vec<u8>>,
    pub upc_e_as_upc_a: UpcEOutputAsUpcA,
    pub undocumented_field: u8,
}

impl Default for UpcEan {
    fn default() -> Self {
        UpcEan {
            upc_status: UpcStatus::Disabled,
            ean_status: EanStatus::Disabled,
            supplementals_status: SupplementalsStatus::Disabled,
            separator_status: SeparatorStatus::Disabled,
            separator_character: Some(b",".to_vec()),
            upc_e_as_upc_a: UpcEOutputAsUpcA::Disabled,
            undocumented_field: 0,
        }
    }
}

impl Setting for UpcEan {
    const CODE: &'static str = "K473";

    // the last five characters before `>` are often all commas: the separator
    // character defaults to `,` and the slot after it is always empty
    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
            Grammar::new(
                UpcEan::CODE,
                &[
                    Slot::choice::<UpcStatus>(),
                    Slot::choice::<EanStatus>(),
                    Slot::choice::<SupplementalsStatus>(),
                    Slot::choice::<SeparatorStatus>(),
                    Slot::chars(1, 1).optional(),
                    Slot::Blank,
                    Slot::choice::<UpcEOutputAsUpcA>(),
                    Slot::digit(0, 1),
                ],
            )
        });
        &GRAMMAR
    }

    fn validate(&self) -> bool {
        self.undocumented_field <= 1 && run_within(&self.separator_character, 1, 1)
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new()
            .choice(self.upc_status)
            .choice(self.ean_status)
            .choice(self.supplementals_status)
            .choice(self.separator_status)
            .chars(self.separator_character.as_deref())
            .blank()
            .choice(self.upc_e_as_upc_a)
            .number(self.undocumented_field))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(UpcEan {
            upc_status: fields.choice()?,
            ean_status: fields.choice()?,
            supplementals_status: fields.choice()?,
            separator_status: fields.choice()?,
            separator_character: fields.chars(),
            upc_e_as_upc_a: fields.choice()?,
            undocumented_field: fields.number()?,
        })
    }
}

wire_enum! {
    pub enum Code93Status {
        Disabled = b'0',
        Enabled = b'1',
    }
}

/// Code 93, K475 (page 5-19)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code93 {
    pub status: Code93Status,
    pub fixed_symbol_length_status: FixedSymbolLengthStatus,
    /// 1 to 64
    pub fixed_symbol_length: u8,
}

impl Default for Code93 {
    fn default() -> Self {
        Code93 {
            status: Code93Status::Disabled,
            fixed_symbol_length_status: FixedSymbolLengthStatus::Disabled,
            fixed_symbol_length: 10,
        }
    }
}

impl Setting for Code93 {
    const CODE: &'static str = "K475";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
            Grammar::new(
                Code93::CODE,
                &[
                    Slot::choice::<Code93Status>(),
                    Slot::choice::<FixedSymbolLengthStatus>(),
                    Slot::digits(1, 2),
                ],
            )
        });
        &GRAMMAR
    }

    fn validate(&self) -> bool {
        (1..=64).contains(&self.fixed_symbol_length)
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new()
            .choice(self.status)
            .choice(self.fixed_symbol_length_status)
            .number(self.fixed_symbol_length))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(Code93 {
            status: fields.choice()?,
            fixed_symbol_length_status: fields.choice()?,
            fixed_symbol_length: fields.number()?,
        })
    }
}

wire_enum! {
    pub enum NarrowMarginsStatus {
        Disabled = b'0',
        Enabled = b'1',
    }
}

wire_enum! {
    pub enum SymbologyIdStatus {
        Disabled = b'0',
        Enabled = b'1',
    }
}

/// Narrow Margins and Symbology Identifier, K450 (page 5-22)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrowMarginsAndSymbologyId {
    pub narrow_margins_status: NarrowMarginsStatus,
    pub symbology_id_status: SymbologyIdStatus,
}

impl Default for NarrowMarginsAndSymbologyId {
    fn default() -> Self {
        NarrowMarginsAndSymbologyId {
            narrow_margins_status: NarrowMarginsStatus::Disabled,
            symbology_id_status: SymbologyIdStatus::Disabled,
        }
    }
}

impl Setting for NarrowMarginsAndSymbologyId {
    const CODE: &'static str = "K450";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
            Grammar::new(
                NarrowMarginsAndSymbologyId::CODE,
                &[
                    Slot::choice::<NarrowMarginsStatus>(),
                    Slot::choice::<SymbologyIdStatus>(),
                ],
            )
        });
        &GRAMMAR
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new()
            .choice(self.narrow_margins_status)
            .choice(self.symbology_id_status))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(NarrowMarginsAndSymbologyId {
            narrow_margins_status: fields.choice()?,
            symbology_id_status: fields.choice()?,
        })
    }
}

wire_enum! {
    pub enum Color {
        White = b'0',
        Black = b'1',
    }
}

/// Background Color, K451 (page 5-24)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundColor {
    pub color: Color,
}

impl Default for BackgroundColor {
    fn default() -> Self {
        BackgroundColor {
            color: Color::White,
        }
    }
}

impl Setting for BackgroundColor {
    const CODE: &'static str = "K451";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> =
            Lazy::new(|| Grammar::new(BackgroundColor::CODE, &[Slot::choice::<Color>()]));
        &GRAMMAR
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new().choice(self.color))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(BackgroundColor {
            color: fields.choice()?,
        })
    }
}

wire_enum! {
    pub enum SymbolRatio {
        Tight = b'0',
        Standard = b'1',
        Aggressive = b'2',
    }
}

/// Symbol Ratio Mode, K452 (page 5-25)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRatioMode {
    pub code39: SymbolRatio,
    pub codabar: SymbolRatio,
    pub interleaved_2_of_5: SymbolRatio,
    pub code93: SymbolRatio,
}

impl Default for SymbolRatioMode {
    fn default() -> Self {
        SymbolRatioMode {
            code39: SymbolRatio::Standard,
            codabar: SymbolRatio::Standard,
            interleaved_2_of_5: SymbolRatio::Standard,
            code93: SymbolRatio::Standard,
        }
    }
}

impl Setting for SymbolRatioMode {
    const CODE: &'static str = "K452";

    fn grammar() -> &'static Grammar {
        static GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
            Grammar::new(
                SymbolRatioMode::CODE,
                &[
                    Slot::choice::<SymbolRatio>(),
                    Slot::choice::<SymbolRatio>(),
                    Slot::choice::<SymbolRatio>(),
                    Slot::choice::<SymbolRatio>(),
                ],
            )
        });
        &GRAMMAR
    }

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new()
            .choice(self.code39)
            .choice(self.codabar)
            .choice(self.interleaved_2_of_5)
            .choice(self.code93))
    }

    fn from_fields(fields: &mut Fields<'_>) -> Result<Self> {
        Ok(SymbolRatioMode {
            code39: fields.choice()?,
            codabar: fields.choice()?,
            interleaved_2_of_5: fields.choice()?,
            code93: fields.choice()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_code39() -> Result<()> {
        let setting = Code39::decode(b"<K470,1,0,0,1,1,32,0>")?;
        assert_eq!(setting.status, Code39Status::Enabled);
        assert_eq!(
            setting.large_intercharacter_gap,
            LargeInterCharacterStatus::Enabled
        );
        assert_eq!(setting.fixed_symbol_length, FixedSymbolLengthStatus::Enabled);
        assert_eq!(setting.symbol_length, 32);
        assert_eq!(Code39::default().encode()?, b"<K470,1,0,0,0,0,10,0>".to_vec());

        let zero_length = Code39 {
            symbol_length: 0,
            ..Default::default()
        };
        assert!(zero_length.encode().is_err());
        assert!(Code39::decode(b"<K470,1,0,0,1,1,320,0>").is_err());
        Ok(())
    }

    #[test]
    fn test_code128() -> Result<()> {
        let setting = Code128::decode(b"<K474,1,0,10,1,0,0,,,0,0>")?;
        assert_eq!(setting.status, Code128Status::Enabled);
        assert_eq!(setting.symbol_length, 10);
        assert_eq!(setting.ean128_status, Ean128Status::Enabled);
        assert_eq!(
            setting.application_record_separator_character,
            Some(b",".to_vec())
        );

        let setting = Code128 {
            status: Code128Status::Enabled,
            fixed_symbol_length_status: FixedSymbolLengthStatus::Enabled,
            symbol_length: 42,
            ean128_status: Ean128Status::Disabled,
            output_format: Code128OutputFormat::Standard,
            application_record_separator_status: ApplicationRecordSeparatorStatus::Disabled,
            application_record_separator_character: Some(b"&".to_vec()),
            application_record_brackets: ApplicationRecordBrackets::Enabled,
            application_record_padding: ApplicationRecordPadding::Enabled,
        };
        assert_eq!(setting.encode()?, b"<K474,1,1,42,0,0,0,&,1,1>".to_vec());
        assert_eq!(Code128::decode(b"<K474,1,1,42,0,0,0,&,1,1>")?, setting);

        let empty_separator = Code128::decode(b"<K474,0,0,10,2,1,1,,0,0>")?;
        assert_eq!(empty_separator.ean128_status, Ean128Status::Required);
        assert_eq!(empty_separator.application_record_separator_character, None);
        Ok(())
    }

    #[test]
    fn test_upc_ean() -> Result<()> {
        let setting = UpcEan::decode(b"<K473,1,0,0,0,,,,0,0>")?;
        assert_eq!(setting.upc_status, UpcStatus::Enabled);
        assert_eq!(setting.ean_status, EanStatus::Disabled);
        assert_eq!(setting.separator_character, Some(b",".to_vec()));
        assert_eq!(setting.undocumented_field, 0);

        let setting = UpcEan::decode(b"<K473,0,1,2,1,|,,1,0>")?;
        assert_eq!(setting.supplementals_status, SupplementalsStatus::Required);
        assert_eq!(setting.separator_status, SeparatorStatus::Enabled);
        assert_eq!(setting.separator_character, Some(b"|".to_vec()));
        assert_eq!(setting.upc_e_as_upc_a, UpcEOutputAsUpcA::Enabled);

        let setting = UpcEan {
            upc_status: UpcStatus::Enabled,
            ean_status: EanStatus::Enabled,
            supplementals_status: SupplementalsStatus::Disabled,
            separator_status: SeparatorStatus::Enabled,
            separator_character: Some(b"!".to_vec()),
            upc_e_as_upc_a: UpcEOutputAsUpcA::Disabled,
            undocumented_field: 0,
        };
        assert_eq!(setting.encode()?, b"<K473,1,1,0,1,!,,0,0>".to_vec());
        assert_eq!(UpcEan::default().encode()?, b"<K473,0,0,0,0,,,,0,0>".to_vec());

        // the unused slot must stay empty
        assert!(UpcEan::decode(b"<K473,0,1,2,1,|,x,1,0>").is_err());

        let undocumented = UpcEan {
            undocumented_field: 2,
            ..Default::default()
        };
        assert!(matches!(
            undocumented.encode(),
            Err(Error::EncodingInvariantViolation { code: "K473", .. })
        ));
        Ok(())
    }

    #[test]
    fn test_code93() -> Result<()> {
        let setting = Code93::decode(b"<K475,1,1,64>")?;
        assert_eq!(setting.status, Code93Status::Enabled);
        assert_eq!(setting.fixed_symbol_length, 64);
        assert_eq!(Code93::default().encode()?, b"<K475,0,0,10>".to_vec());
        Ok(())
    }

    #[test]
    fn test_narrow_margins_and_background_color() -> Result<()> {
        let setting = NarrowMarginsAndSymbologyId::decode(b"<K450,1,0>")?;
        assert_eq!(setting.narrow_margins_status, NarrowMarginsStatus::Enabled);
        assert_eq!(setting.symbology_id_status, SymbologyIdStatus::Disabled);
        assert!(NarrowMarginsAndSymbologyId::decode(b"<K450,1>").is_err());

        assert_eq!(BackgroundColor::decode(b"<K451,1>")?.color, Color::Black);
        assert_eq!(BackgroundColor::default().encode()?, b"<K451,0>".to_vec());
        Ok(())
    }

    #[test]
    fn test_symbol_ratio_mode() -> Result<()> {
        let setting = SymbolRatioMode::decode(b"<K452,1,2,0,1>")?;
        assert_eq!(setting.code39, SymbolRatio::Standard);
        assert_eq!(setting.codabar, SymbolRatio::Aggressive);
        assert_eq!(setting.interleaved_2_of_5, SymbolRatio::Tight);
        assert_eq!(setting.code93, SymbolRatio::Standard);
        assert_eq!(setting.encode()?, b"<K452,1,2,0,1>".to_vec());
        assert!(SymbolRatioMode::decode(b"<K452,1,2,0,3>").is_err());
        Ok(())
    }
}
