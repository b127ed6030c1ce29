//! Setting registry and the configuration aggregate of one device.
//!
//! The registry is an explicit table of every supported setting family in the
//! order the device reports them. [`Configuration`] holds one optional slot per
//! registry entry and is converted to and from batches of wire fragments.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::bytes::Regex;
use tracing::{debug, info};

use crate::codec::Setting;
use crate::error::{Error, Result};
use crate::settings::*;

/// one registered setting family
#[derive(Clone, Copy)]
pub struct Entry {
    /// K-code of the family, e.g. `K100`
    pub code: &'static str,
    /// name of the [`Configuration`] slot holding the family
    pub name: &'static str,
    decode: fn(&[u8]) -> Result<AnySetting>,
}

impl Entry {
    /// decode a fragment of this family
    pub fn decode(&self, fragment: &[u8]) -> Result<AnySetting> {
        (self.decode)(fragment)
    }
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("code", &self.code)
            .field("name", &self.name)
            .finish()
    }
}

fn decode_as<S>(fragment: &[u8]) -> Result<AnySetting>
where
    S: Setting + Into<AnySetting>,
{
    S::decode(fragment).map(Into::into)
}

macro_rules! registry {
    ( $( $field:ident : $setting:ident ),+ $(,)? ) => {
        /// a decoded setting of any registered family
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum AnySetting {
            $( $setting($setting), )+
        }

        impl AnySetting {
            /// K-code of the setting family
            pub fn code(&self) -> &'static str {
                match self {
                    $( AnySetting::$setting(_) => $setting::CODE, )+
                }
            }

            pub fn encode(&self) -> Result<Vec<u8>> {
                match self {
                    $( AnySetting::$setting(setting) => setting.encode(), )+
                }
            }
        }

        $(
            impl From<$setting> for AnySetting {
                fn from(setting: $setting) -> Self {
                    AnySetting::$setting(setting)
                }
            }
        )+

        /// Configuration of a barcode reader, one optional slot per setting family.
        ///
        /// A slot left at `None` is not part of the serialized configuration.
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct Configuration {
            $( pub $field: Option<$setting>, )+
        }

        impl Configuration {
            /// configuration with every slot empty
            pub fn empty() -> Self {
                Configuration {
                    $( $field: None, )+
                }
            }

            /// overwrite every slot with the documented default of its family
            pub fn load_defaults(&mut self) {
                $( self.$field = Some($setting::default()); )+
            }

            /// store a setting in its slot, replacing the previous value
            pub fn insert(&mut self, setting: AnySetting) {
                match setting {
                    $( AnySetting::$setting(setting) => self.$field = Some(setting), )+
                }
            }

            /// copy of the slot registered for a K-code
            pub fn get(&self, code: &str) -> Option<AnySetting> {
                match code {
                    $( code if code == $setting::CODE => self.$field.clone().map(AnySetting::$setting), )+
                    _ => None,
                }
            }

            /// serialize every present slot in registry order, joined by `separator`
            pub fn to_wire(&self, separator: &[u8]) -> Result<Vec<u8>> {
                let mut fragments = Vec::new();
                $(
                    if let Some(setting) = &self.$field {
                        fragments.push(setting.encode()?);
                    }
                )+
                Ok(fragments.join(separator))
            }
        }

        static ENTRIES: &[Entry] = &[
            $(
                Entry {
                    code: $setting::CODE,
                    name: stringify!($field),
                    decode: decode_as::<$setting>,
                },
            )+
        ];
    };
}

registry! {
    host_port_connection: HostPortConnection,
    host_protocol: HostProtocol,
    host_rs422_status: HostRs422Status,
    rs232_auxiliary_port: Rs232AuxiliaryPort,
    preamble: Preamble,
    postamble: Postamble,
    lrc: Lrc,
    inter_character_delay: InterCharacterDelay,
    multisymbol: Multisymbol,
    trigger: Trigger,
    external_trigger: ExternalTrigger,
    serial_trigger: SerialTrigger,
    start_trigger_character: StartTriggerCharacter,
    stop_trigger_character: StopTriggerCharacter,
    end_read_cycle: EndReadCycle,
    decodes_before_output: DecodesBeforeOutput,
    scan_speed: ScanSpeed,
    scanner_setup: ScannerSetup,
    symbol_detect: SymbolDetect,
    maximum_element: MaximumElement,
    scan_width_enhance: ScanWidthEnhance,
    laser_setup: LaserSetup,
    code39: Code39,
    code128: Code128,
    upc_ean: UpcEan,
    code93: Code93,
    narrow_margins_and_symbology_id: NarrowMarginsAndSymbologyId,
    background_color: BackgroundColor,
    symbol_ratio_mode: SymbolRatioMode,
}

static BY_CODE: Lazy<HashMap<&'static str, &'static Entry>> =
    Lazy::new(|| ENTRIES.iter().map(|entry| (entry.code, entry)).collect());

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s-u)^<(K\d+).*>").expect("identifier pattern is valid"));

static FRAGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?-u)<K[^>]*>").expect("fragment pattern is valid"));

/// all registered setting families in registry order
pub fn entries() -> &'static [Entry] {
    ENTRIES
}

/// registry entry for a K-code
pub fn lookup(code: &str) -> Option<&'static Entry> {
    BY_CODE.get(code).copied()
}

/// name of the configuration slot for a K-code
pub fn slot_name(code: &str) -> Option<&'static str> {
    lookup(code).map(|entry| entry.name)
}

/// leading K-code of a fragment, if it has one
fn identifier(fragment: &[u8]) -> Option<String> {
    IDENTIFIER
        .captures(fragment)
        .and_then(|captures| captures.get(1))
        .map(|code| String::from_utf8_lossy(code.as_bytes()).into_owned())
}

/// decode a single fragment of any registered family
pub fn decode_fragment(fragment: &[u8]) -> Result<AnySetting> {
    let code = identifier(fragment).ok_or_else(|| {
        Error::UnknownSettingIdentifier(String::from_utf8_lossy(fragment).into_owned())
    })?;
    let entry = lookup(&code).ok_or(Error::UnknownSettingIdentifier(code))?;
    entry.decode(fragment)
}

/// every `<K...>` fragment in a raw device response, in order
///
/// The device reports its settings back to back without separators.
pub fn extract_fragments(raw: &[u8]) -> Vec<Vec<u8>> {
    FRAGMENT
        .find_iter(raw)
        .map(|fragment| fragment.as_bytes().to_vec())
        .collect()
}

impl Configuration {
    /// configuration with every slot set to the documented default
    pub fn new() -> Self {
        let mut configuration = Self::empty();
        configuration.load_defaults();
        configuration
    }

    /// build a configuration from a batch of fragments
    ///
    /// With `apply_defaults` every slot starts at its default, otherwise slots
    /// without a fragment stay empty. See [`Configuration::apply_wire_batch`].
    pub fn from_wire_batch<I, F>(fragments: I, apply_defaults: bool) -> Result<Self>
    where
        I: IntoIterator<Item = F>,
        F: AsRef<[u8]>,
    {
        let mut configuration = if apply_defaults {
            Self::new()
        } else {
            Self::empty()
        };
        configuration.apply_wire_batch(fragments)?;
        Ok(configuration)
    }

    /// decode fragments in order into their slots, later fragments win
    ///
    /// Fragments without a K-code or with an unregistered one are skipped.
    /// A malformed fragment of a registered family aborts the batch.
    pub fn apply_wire_batch<I, F>(&mut self, fragments: I) -> Result<()>
    where
        I: IntoIterator<Item = F>,
        F: AsRef<[u8]>,
    {
        for fragment in fragments {
            let fragment = fragment.as_ref();
            let Some(code) = identifier(fragment) else {
                info!(
                    "skipping fragment without K-code: {}",
                    String::from_utf8_lossy(fragment)
                );
                continue;
            };
            let Some(entry) = lookup(&code) else {
                info!("cannot find setting for K-code {}", code);
                continue;
            };
            debug!("decoding {} into {}", code, entry.name);
            self.insert(entry.decode(fragment)?);
        }
        Ok(())
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}
