//! JSON output with four-space indentation

use serde::Serialize;
use serde_json::Serializer;
use serde_json::ser::PrettyFormatter;

use crate::error::PackageResult;

/// Serialize `value` as pretty JSON indented by four spaces
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> PackageResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    Ok(out)
}
