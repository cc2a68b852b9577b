//! Parsing of the AT text sub-protocol spoken by the Wi-Fi module.
//!
//! Replies are CRLF-separated lines. Line 0 echoes the command; records
//! follow as `+TAG:(csv)` or `+TAG:csv`. No header row is sent, so field
//! names are positional.

use crate::error::{Error, Result};
use crate::types::{AccessPoint, EncryptionMethod, WifiStatus};

/// Line terminator of AT replies.
pub const LINE_TERMINATOR: &str = "\r\n";

/// Prefix of the association status record.
const CWJAP_PREFIX: &str = "+CWJAP:";

/// Prefix of the station MAC record.
const MAC_MARKER: &str = "MAC:";

/// Splits a reply into lines, keeping empty ones.
#[must_use]
pub fn split_lines(text: &str) -> Vec<String> {
    text.split(LINE_TERMINATOR).map(str::to_owned).collect()
}

/// Splits one CSV record, honouring double-quoted fields.
///
/// Quotes are removed; a comma inside quotes belongs to the field.
#[must_use]
pub fn split_csv(record: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = record.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Returns the CSV body of a `+TAG:(...)` line.
fn parenthesized_body(line: &str) -> Option<&str> {
    let (_, rest) = line.split_once(":(")?;
    Some(rest.strip_suffix(')').unwrap_or(rest))
}

/// Parses the `AT+CWLAP` scan reply.
///
/// Line 0 is skipped, as is any later line without a `:(` record.
pub fn parse_access_points(lines: &[String]) -> Result<Vec<AccessPoint>> {
    let mut networks = Vec::new();
    for line in lines.iter().skip(1) {
        let Some(body) = parenthesized_body(line) else {
            if !line.trim().is_empty() && line.trim() != "OK" {
                tracing::warn!("ignoring non-record scan line: {:?}", line);
            }
            continue;
        };
        networks.push(parse_access_point(body)?);
    }
    Ok(networks)
}

/// Parses one access-point CSV body.
pub fn parse_access_point(body: &str) -> Result<AccessPoint> {
    let mut fields = split_csv(body).into_iter();

    let code_text = fields.next().unwrap_or_default();
    let code = code_text.trim().parse::<i64>().map_err(|_| Error::Protocol {
        message: format!("invalid encryption code {code_text:?}"),
    })?;
    let encryption = EncryptionMethod::from_code(code)?;
    let ssid = fields.next().ok_or_else(|| Error::Protocol {
        message: format!("access point record without network name: {body:?}"),
    })?;

    Ok(AccessPoint {
        encryption,
        ssid,
        rssi: fields.next(),
        mac: fields.next(),
        channel: fields.next(),
        freq_offset: fields.next(),
        freqcal_val: fields.next(),
        pairwise_cipher: fields.next(),
        group_cipher: fields.next(),
        bgn: fields.next(),
        wps: fields.next(),
    })
}

/// Parses the `AT+CWJAP?` reply.
///
/// Returns `None` when line 1 carries no status record (the module says
/// `No AP` when it is not associated).
#[must_use]
pub fn parse_wifi_status(lines: &[String]) -> Option<WifiStatus> {
    let body = lines.get(1)?.strip_prefix(CWJAP_PREFIX)?;
    let mut fields = split_csv(body).into_iter();

    Some(WifiStatus {
        ssid: fields.next()?,
        bssid: fields.next(),
        channel: fields.next(),
        rssi: fields.next(),
        pci_en: fields.next(),
        reconn_interval: fields.next(),
        listen_interval: fields.next(),
        scan_mode: fields.next(),
        pmf: fields.next(),
    })
}

/// Parses the `AT+CIPSTAMAC?` reply (`+CIPSTAMAC:"aa:bb:cc:dd:ee:ff"`).
pub fn parse_mac_address(lines: &[String]) -> Result<String> {
    let line = lines.get(1).map(String::as_str).unwrap_or_default();
    let (_, value) = line.split_once(MAC_MARKER).ok_or_else(|| Error::Protocol {
        message: format!("no MAC address in {line:?}"),
    })?;
    Ok(value.trim().trim_matches('"').to_owned())
}
