//! Encoding and decoding of single `<Kxxx,p1,p2,...>` setting fragments.
//!
//! Every setting family declares its positional grammar as a list of [`Slot`]s.
//! The grammar is compiled once into an anchored byte regex which is used both
//! to decode fragments and to check every fragment produced by `encode`.

use std::fmt::{Debug, Display};
use std::str::FromStr;

use regex::bytes::{Captures, Regex};
use tracing::trace;

use crate::error::{Error, Result};

/// Pattern matching one character of a setting value.
///
/// Characters below 0x20 travel as `^` followed by a letter (MS3 manual page
/// A-11), so a value character is either such an escape or any single byte.
pub const ASCII_CHAR: &str = r"(?:\^[A-Z\[\\\]\^_]|.)";

/// baud rates supported by the device, keyed by their wire digit
pub const BAUD_RATES: [(u8, u32); 9] = [
    (b'0', 600),
    (b'1', 1200),
    (b'2', 2400),
    (b'3', 4800),
    (b'4', 9600),
    (b'5', 19200),
    (b'6', 38400),
    (b'7', 57600),
    (b'8', 115200),
];

/// look up the wire digit for a baud rate in bits per second
pub fn baud_rate_code(baud_rate: u32) -> Option<u8> {
    BAUD_RATES
        .iter()
        .find(|(_, bps)| *bps == baud_rate)
        .map(|(code, _)| *code)
}

/// look up the baud rate in bits per second for a wire digit
pub fn baud_rate_from_code(code: u8) -> Option<u32> {
    BAUD_RATES
        .iter()
        .find(|(digit, _)| *digit == code)
        .map(|(_, bps)| *bps)
}

/// number of characters in a value, counting a `^X` escape as one character
pub fn char_count(value: &[u8]) -> usize {
    let mut count = 0;
    let mut index = 0;
    while index < value.len() {
        if value[index] == b'^' && value.get(index + 1).is_some_and(|&next| is_escape_letter(next)) {
            index += 2;
        } else {
            index += 1;
        }
        count += 1;
    }
    count
}

fn is_escape_letter(byte: u8) -> bool {
    byte.is_ascii_uppercase() || matches!(byte, b'[' | b'\\' | b']' | b'^' | b'_')
}

/// true when an optional character run is unset or holds `min..=max` characters
pub(crate) fn run_within(value: &Option<Vec<u8>>, min: usize, max: usize) -> bool {
    match value {
        Some(value) => (min..=max).contains(&char_count(value)),
        None => true,
    }
}

/// An enumeration whose variants travel as a single wire digit.
///
/// Setting families define their own enumerations even where the shape is
/// shared, as the same digit means different things in different families.
/// Only the serial line enumerations and the fixed symbol length status are
/// used by more than one family.
pub trait WireEnum: Sized + Copy + Debug + 'static {
    /// all variants, in wire order
    const VARIANTS: &'static [Self];

    /// the wire digit of this variant
    fn code(self) -> u8;

    fn from_code(code: u8) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|variant| variant.code() == code)
    }
}

/// declare an enumeration together with its wire digits
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$variant_meta:meta])* $variant:ident = $code:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$variant_meta])* $variant, )+
        }

        impl $crate::codec::WireEnum for $name {
            const VARIANTS: &'static [Self] = &[ $( $name::$variant, )+ ];

            fn code(self) -> u8 {
                match self {
                    $( $name::$variant => $code, )+
                }
            }
        }
    };
}

/// one positional parameter of a setting grammar
#[derive(Debug, Clone)]
pub enum Slot {
    /// a captured parameter
    Field { pattern: String, optional: bool },
    /// a parameter the device always leaves empty, not captured
    Blank,
    /// any further comma separated parameters, accepted and ignored on decode
    Trailing,
}

impl Slot {
    /// single digit restricted to the codes of an enumeration
    pub fn choice<E: WireEnum>() -> Self {
        let codes: String = E::VARIANTS.iter().map(|variant| variant.code() as char).collect();
        Self::field(format!("[{}]", codes))
    }

    /// single digit, mapped through the baud rate table on decode
    pub fn baud_rate() -> Self {
        Self::digit(0, 9)
    }

    /// single decimal digit within `min..=max`
    pub fn digit(min: u8, max: u8) -> Self {
        Self::field(format!("[{}-{}]", min, max))
    }

    /// decimal number with `min..=max` digits
    pub fn digits(min: usize, max: usize) -> Self {
        Self::field(format!(r"\d{{{},{}}}", min, max))
    }

    /// a byte written as two hex digits
    pub fn hex_byte() -> Self {
        Self::field(String::from("[0-9a-fA-F]{2}"))
    }

    /// run of `min..=max` value characters (literal or escaped)
    pub fn chars(min: usize, max: usize) -> Self {
        Self::field(format!("{}{{{},{}}}", ASCII_CHAR, min, max))
    }

    /// the parameter may be left empty
    pub fn optional(self) -> Self {
        match self {
            Slot::Field { pattern, .. } => Slot::Field {
                pattern,
                optional: true,
            },
            other => other,
        }
    }

    fn field(pattern: String) -> Self {
        Slot::Field {
            pattern,
            optional: false,
        }
    }
}

/// compiled positional grammar of one setting family
#[derive(Debug)]
pub struct Grammar {
    code: &'static str,
    regex: Regex,
}

impl Grammar {
    /// compile the grammar `<code,slot,slot,...>` for a setting family
    ///
    /// # Panics
    ///
    /// Panics if the slots do not form a valid pattern, which only happens for
    /// a programming error in a setting declaration.
    pub fn new(code: &'static str, slots: &[Slot]) -> Self {
        let mut pattern = format!("(?s-u)^<{}", code);
        for slot in slots {
            match slot {
                Slot::Field { pattern: field, optional } => {
                    pattern.push_str(",(");
                    pattern.push_str(field);
                    pattern.push(')');
                    if *optional {
                        pattern.push('?');
                    }
                }
                Slot::Blank => pattern.push(','),
                Slot::Trailing => pattern.push_str("(?:,.*)?"),
            }
        }
        pattern.push_str(">$");
        trace!("grammar for {}: {}", code, pattern);
        let regex = Regex::new(&pattern).expect("setting grammar is a valid pattern");
        Grammar { code, regex }
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// true when the fragment fits this grammar exactly
    pub fn is_match(&self, fragment: &[u8]) -> bool {
        self.regex.is_match(fragment)
    }

    /// match a fragment and hand out its captured parameters in order
    pub fn fields<'a>(&self, fragment: &'a [u8]) -> Result<Fields<'a>> {
        let captures = self
            .regex
            .captures(fragment)
            .ok_or_else(|| Error::malformed(self.code, fragment))?;
        Ok(Fields {
            code: self.code,
            fragment,
            captures,
            next: 1,
        })
    }
}

/// captured parameters of a fragment, consumed front to back
pub struct Fields<'a> {
    code: &'static str,
    fragment: &'a [u8],
    captures: Captures<'a>,
    next: usize,
}

impl<'a> Fields<'a> {
    fn raw(&mut self) -> &'a [u8] {
        let value = self
            .captures
            .get(self.next)
            .map(|capture| capture.as_bytes())
            .unwrap_or_default();
        self.next += 1;
        value
    }

    fn malformed(&self) -> Error {
        Error::malformed(self.code, self.fragment)
    }

    /// enumerated single digit parameter
    pub fn choice<E: WireEnum>(&mut self) -> Result<E> {
        match self.raw() {
            [code] => E::from_code(*code).ok_or_else(|| self.malformed()),
            _ => Err(self.malformed()),
        }
    }

    /// baud rate parameter, converted to bits per second
    pub fn baud_rate(&mut self) -> Result<u32> {
        match self.raw() {
            [code] => baud_rate_from_code(*code)
                .ok_or_else(|| Error::UnknownBaudRate(String::from(*code as char))),
            _ => Err(self.malformed()),
        }
    }

    /// decimal parameter which must be present
    pub fn number<T: FromStr>(&mut self) -> Result<T> {
        self.optional_number()?.ok_or_else(|| self.malformed())
    }

    /// decimal parameter, empty becomes `None`
    pub fn optional_number<T: FromStr>(&mut self) -> Result<Option<T>> {
        let raw = self.raw();
        if raw.is_empty() {
            return Ok(None);
        }
        std::str::from_utf8(raw)
            .ok()
            .and_then(|text| text.parse().ok())
            .map(Some)
            .ok_or_else(|| self.malformed())
    }

    /// character run, passed through as captured; empty becomes `None`
    pub fn chars(&mut self) -> Option<Vec<u8>> {
        let raw = self.raw();
        (!raw.is_empty()).then(|| raw.to_vec())
    }

    /// byte written as two hex digits, empty becomes `None`
    pub fn hex_byte(&mut self) -> Result<Option<u8>> {
        let raw = self.raw();
        if raw.is_empty() {
            return Ok(None);
        }
        std::str::from_utf8(raw)
            .ok()
            .and_then(|text| u8::from_str_radix(text, 16).ok())
            .map(Some)
            .ok_or_else(|| self.malformed())
    }
}

/// ordered parameter values of a fragment under construction
#[derive(Debug, Default)]
pub struct Params(Vec<Vec<u8>>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn choice<E: WireEnum>(mut self, value: E) -> Self {
        self.0.push(vec![value.code()]);
        self
    }

    pub fn baud_rate(mut self, baud_rate: u32) -> Result<Self> {
        let code = baud_rate_code(baud_rate)
            .ok_or_else(|| Error::UnknownBaudRate(baud_rate.to_string()))?;
        self.0.push(vec![code]);
        Ok(self)
    }

    pub fn number(mut self, value: impl Display) -> Self {
        self.0.push(value.to_string().into_bytes());
        self
    }

    pub fn optional_number(mut self, value: Option<impl Display>) -> Self {
        self.0.push(
            value
                .map(|value| value.to_string().into_bytes())
                .unwrap_or_default(),
        );
        self
    }

    pub fn chars(mut self, value: Option<&[u8]>) -> Self {
        self.0.push(value.map(<[u8]>::to_vec).unwrap_or_default());
        self
    }

    pub fn hex_byte(mut self, value: Option<u8>) -> Self {
        self.0.push(
            value
                .map(|byte| format!("{:02X}", byte).into_bytes())
                .unwrap_or_default(),
        );
        self
    }

    /// the always-empty parameter of a [`Slot::Blank`]
    pub fn blank(mut self) -> Self {
        self.0.push(Vec::new());
        self
    }

    /// `<code,p1,p2,...>`
    pub fn into_fragment(self, code: &str) -> Vec<u8> {
        let mut fragment = Vec::with_capacity(2 + code.len() + self.0.iter().map(|p| p.len() + 1).sum::<usize>());
        fragment.push(b'<');
        fragment.extend_from_slice(code.as_bytes());
        for param in self.0 {
            fragment.push(b',');
            fragment.extend(param);
        }
        fragment.push(b'>');
        fragment
    }
}

/// A setting family: a typed value bound to a K-code and its parameter grammar.
pub trait Setting: Sized + Default + Clone + PartialEq + Debug {
    /// identifier of the family on the wire, e.g. `K100`
    const CODE: &'static str;

    /// the positional grammar of the family
    fn grammar() -> &'static Grammar;

    /// parameter values in wire order
    fn to_params(&self) -> Result<Params>;

    /// build a value from the captured parameters in wire order
    fn from_fields(fields: &mut Fields<'_>) -> Result<Self>;

    /// field level bounds check, independent of the wire format
    fn validate(&self) -> bool {
        true
    }

    /// serialize into a `<Kxxx,...>` fragment
    ///
    /// Fails with [`Error::EncodingInvariantViolation`] when the value does not
    /// validate or the fragment does not fit the family grammar.
    fn encode(&self) -> Result<Vec<u8>> {
        let fragment = self.to_params()?.into_fragment(Self::CODE);
        if !self.validate() || !Self::grammar().is_match(&fragment) {
            return Err(Error::EncodingInvariantViolation {
                code: Self::CODE,
                fragment: String::from_utf8_lossy(&fragment).into_owned(),
            });
        }
        Ok(fragment)
    }

    /// parse a `<Kxxx,...>` fragment of this family
    fn decode(fragment: &[u8]) -> Result<Self> {
        let mut fields = Self::grammar().fields(fragment)?;
        Self::from_fields(&mut fields)
    }
}
