//! # Payload Encoding
//!
//! Builds the strings printed into each label's codes.
//!
//! ## Styles
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  FULL REFERENCE                                                         │
//! │    target: http://plmsys.aiforoptometry.com/detail?serial_number=<sn>   │
//! │    scan payload: none (the remote store resolves everything)           │
//! │                                                                         │
//! │  COMPACT                                                                │
//! │    raw:     <code>|<sph>|<cyl>|<serial>       e.g. 6|-3.00|-0.50|…-1    │
//! │    payload: URI-component escaped raw         6%7C-3.00%7C-0.50%7C…-1   │
//! │    target:  https://lucasyxc.github.io/jingzhiguanwang/?d=<payload>     │
//! │    barcode: <serial>                                                    │
//! │                                                                         │
//! │  BOTH: display powers (S, C) and the transposed pair (S+C, -C),        │
//! │  two decimals, "+" when strictly positive                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Encoding is pure: the same record and style always yield the same bytes.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::codes::ProductCodeTable;
use crate::diopter::Diopter;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{LabelStyle, LensRecord};

/// Default full-reference lookup page.
pub const DEFAULT_FULL_REFERENCE_URL: &str = "http://plmsys.aiforoptometry.com/detail";

/// Query parameter carrying the serial number on full-reference targets.
pub const DEFAULT_FULL_REFERENCE_PARAM: &str = "serial_number";

/// Default compact-payload landing page.
pub const DEFAULT_COMPACT_URL: &str = "https://lucasyxc.github.io/jingzhiguanwang/";

/// Query parameter carrying the compact payload.
pub const DEFAULT_COMPACT_PARAM: &str = "d";

/// Field separator inside a compact payload.
pub const COMPACT_SEPARATOR: char = '|';

/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is escaped, the same
/// set browsers leave alone in a URI component. A space becomes `%20`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

// =============================================================================
// Settings
// =============================================================================

/// Target URLs and parameter names for both styles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderSettings {
    pub full_reference_url: String,
    pub full_reference_param: String,
    pub compact_url: String,
    pub compact_param: String,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        EncoderSettings {
            full_reference_url: DEFAULT_FULL_REFERENCE_URL.to_string(),
            full_reference_param: DEFAULT_FULL_REFERENCE_PARAM.to_string(),
            compact_url: DEFAULT_COMPACT_URL.to_string(),
            compact_param: DEFAULT_COMPACT_PARAM.to_string(),
        }
    }
}

// =============================================================================
// Display Powers
// =============================================================================

/// Sign-transposed power pair: `(sph + cyl, -cyl)`.
///
/// ## Example
/// ```rust
/// use lens_core::diopter::Diopter;
/// use lens_core::payload::transpose;
///
/// let (sph, cyl) = transpose(Diopter::from_hundredths(-200), Diopter::from_hundredths(-75));
/// assert_eq!((sph.signed(), cyl.signed()), ("-2.75".to_string(), "+0.75".to_string()));
/// ```
pub fn transpose(spherical: Diopter, cylinder: Diopter) -> (Diopter, Diopter) {
    (spherical + cylinder, -cylinder)
}

/// The four power strings printed on a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DisplayPowers {
    pub spherical: String,
    pub cylinder: String,
    pub transposed_spherical: String,
    pub transposed_cylinder: String,
}

impl DisplayPowers {
    pub fn new(spherical: Diopter, cylinder: Diopter) -> Self {
        let (transposed_spherical, transposed_cylinder) = transpose(spherical, cylinder);
        DisplayPowers {
            spherical: spherical.signed(),
            cylinder: cylinder.signed(),
            transposed_spherical: transposed_spherical.signed(),
            transposed_cylinder: transposed_cylinder.signed(),
        }
    }
}

// =============================================================================
// Encoded Payload
// =============================================================================

/// Everything a renderer needs to draw the codes of one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EncodedPayload {
    pub style: LabelStyle,
    /// Escaped compact payload; `None` for full-reference labels.
    pub scan_payload: Option<String>,
    /// URL placed in the 2D code.
    pub target_reference: String,
    /// Linear barcode content; compact labels only.
    pub barcode: Option<String>,
    pub display: DisplayPowers,
}

/// The four fields of a decoded compact payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactFields {
    pub product_code: String,
    pub spherical: Diopter,
    pub cylinder: Diopter,
    pub serial_number: String,
}

// =============================================================================
// Encoder
// =============================================================================

/// Stateless encoder holding parsed target URLs and the product-code table.
#[derive(Debug, Clone)]
pub struct PayloadEncoder {
    full_reference_url: Url,
    full_reference_param: String,
    compact_url: Url,
    compact_param: String,
    codes: ProductCodeTable,
}

impl PayloadEncoder {
    /// Validates the settings and builds an encoder.
    ///
    /// ## Errors
    /// - `InvalidUrl` if a target URL does not parse or is not http(s)
    /// - `Validation(Required)` if a parameter name is empty
    pub fn new(settings: EncoderSettings, codes: ProductCodeTable) -> CoreResult<Self> {
        Ok(PayloadEncoder {
            full_reference_url: parse_target(&settings.full_reference_url)?,
            full_reference_param: require_param("full_reference_param", settings.full_reference_param)?,
            compact_url: parse_target(&settings.compact_url)?,
            compact_param: require_param("compact_param", settings.compact_param)?,
            codes,
        })
    }

    /// Encodes a record in the style of its catalog group.
    pub fn encode_record(&self, record: &LensRecord) -> EncodedPayload {
        self.encode(record, record.style)
    }

    /// Encodes a record in an explicit style.
    pub fn encode(&self, record: &LensRecord, style: LabelStyle) -> EncodedPayload {
        let display = DisplayPowers::new(record.spherical, record.cylinder);

        match style {
            LabelStyle::FullReference => EncodedPayload {
                style,
                scan_payload: None,
                target_reference: with_query(
                    &self.full_reference_url,
                    &self.full_reference_param,
                    &escape(&record.serial_number),
                ),
                barcode: None,
                display,
            },
            LabelStyle::Compact => {
                let scan_payload = escape(&self.compact_raw(record));
                EncodedPayload {
                    style,
                    target_reference: with_query(&self.compact_url, &self.compact_param, &scan_payload),
                    scan_payload: Some(scan_payload),
                    barcode: Some(record.serial_number.clone()),
                    display,
                }
            }
        }
    }

    /// Unencoded `code|sph|cyl|serial`.
    fn compact_raw(&self, record: &LensRecord) -> String {
        let sep = COMPACT_SEPARATOR.to_string();
        [
            self.codes.code_for(&record.product_name).to_string(),
            record.spherical.to_string(),
            record.cylinder.to_string(),
            record.serial_number.clone(),
        ]
        .join(&sep)
    }
}

/// Parses an escaped compact payload back into its fields.
///
/// The product code is everything before the last three separators, so a
/// fallback product name containing `|` still decodes.
///
/// ## Example
/// ```rust
/// use lens_core::payload::decode_compact;
///
/// let fields = decode_compact("6%7C-3.00%7C-0.50%7C20261016083015-1").unwrap();
/// assert_eq!(fields.product_code, "6");
/// assert_eq!(fields.cylinder.to_string(), "-0.50");
/// assert_eq!(fields.serial_number, "20261016083015-1");
/// ```
pub fn decode_compact(scan_payload: &str) -> CoreResult<CompactFields> {
    let raw = percent_decode_str(scan_payload)
        .decode_utf8()
        .map_err(|e| ValidationError::InvalidFormat {
            field: "scan_payload".to_string(),
            reason: e.to_string(),
        })?;

    let mut fields = raw.rsplitn(4, COMPACT_SEPARATOR);
    let (Some(serial), Some(cyl), Some(sph), Some(code)) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(ValidationError::InvalidFormat {
            field: "scan_payload".to_string(),
            reason: "expected code|spherical|cylinder|serial".to_string(),
        }
        .into());
    };

    if code.is_empty() || serial.is_empty() {
        return Err(ValidationError::InvalidFormat {
            field: "scan_payload".to_string(),
            reason: "product code and serial number must not be empty".to_string(),
        }
        .into());
    }

    Ok(CompactFields {
        product_code: code.to_string(),
        spherical: Diopter::parse("spherical", sph)?,
        cylinder: Diopter::parse("cylinder", cyl)?,
        serial_number: serial.to_string(),
    })
}

fn parse_target(raw: &str) -> CoreResult<Url> {
    let url = Url::parse(raw).map_err(|e| CoreError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(CoreError::InvalidUrl {
            url: raw.to_string(),
            reason: "scheme must be http or https".to_string(),
        });
    }

    Ok(url)
}

fn require_param(field: &str, name: String) -> CoreResult<String> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        }
        .into());
    }
    Ok(name)
}

fn escape(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Appends `param=value` to the base query; `value` must already be escaped.
fn with_query(base: &Url, param: &str, value: &str) -> String {
    let pair = format!("{}={}", escape(param), value);
    let query = match base.query() {
        Some(existing) if !existing.is_empty() => format!("{existing}&{pair}"),
        _ => pair,
    };

    let mut url = base.clone();
    url.set_query(Some(&query));
    url.to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
