//! JSON message types carried in the `json` region of a packet.

use serde::{Deserialize, Serialize};

/// Command codes understood by the device, plus the response tag.
///
/// Only the device-bound codes are meaningful as request tags; `Resp`
/// is what a response packet's `code` byte conceptually carries, but the
/// client does not validate it strictly on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Code {
    Resp = 0x00,
    Sync = 0x01,
    Cd = 0x11,
    Ls = 0x12,
    Rm = 0x13,
    Get = 0x21,
    Put = 0x22,
    Reboot = 0x31,
}

impl Code {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// One entry in an `LS` response's `entries` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// File or directory name.
    pub n: String,
    /// `"f"` for a file, `"d"` for a directory.
    pub t: EntryKind,
    /// Size in bytes. Unspecified for directories but always present.
    pub s: u64,
}

/// The `t` discriminator on a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    #[serde(rename = "f")]
    File,
    #[serde(rename = "d")]
    Dir,
}

/// Decoded response metadata.
///
/// The device's JSON is loosely typed — `ok` is always present, and the
/// other keys that appear depend on which command was sent. Rather than
/// probing a raw [`serde_json::Value`] at every call site, this models
/// the shapes the keys actually distinguish as a serde internally-untagged
/// enum: the first variant whose required fields are all present wins,
/// tried in declaration order. `Err` is tried before the generic `Ok` so
/// that a failure response is never mistaken for a bare success; the
/// shape-specific success variants (`entries`, `eof`) are tried before
/// both, since they carry fields the generic case lacks.
///
/// Unknown keys are ignored — none of the variants use
/// `deny_unknown_fields`, so a device that adds a field in a later
/// firmware revision doesn't break decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseMeta {
    /// `{"ok": true, "entries": [...]}` — an `LS` success.
    OkEntries { ok: bool, entries: Vec<Entry> },
    /// `{"ok": true, "eof": bool, "bin": n?}` — a `GET` success.
    OkTransfer {
        ok: bool,
        eof: bool,
        #[serde(default)]
        bin: Option<u64>,
    },
    /// `{"ok": false, "err": "..."}` — any command's failure.
    Err { ok: bool, err: String },
    /// `{"ok": true}` — the generic success case (`CD`, `RM`, `REBOOT`).
    Ok { ok: bool },
}

impl ResponseMeta {
    /// Whether the device reported success.
    pub fn is_ok(&self) -> bool {
        match self {
            ResponseMeta::OkEntries { ok, .. }
            | ResponseMeta::OkTransfer { ok, .. }
            | ResponseMeta::Err { ok, .. }
            | ResponseMeta::Ok { ok } => *ok,
        }
    }

    /// The error string, if this is the failure variant.
    pub fn err(&self) -> Option<&str> {
        match self {
            ResponseMeta::Err { err, .. } => Some(err.as_str()),
            _ => None,
        }
    }

    /// The directory entries, if this is an `LS` success.
    pub fn entries(&self) -> Option<&[Entry]> {
        match self {
            ResponseMeta::OkEntries { entries, .. } => Some(entries),
            _ => None,
        }
    }

    /// `(eof, bin)` if this is a `GET`-shaped success.
    pub fn transfer(&self) -> Option<(bool, Option<u64>)> {
        match self {
            ResponseMeta::OkTransfer { eof, bin, .. } => Some((*eof, *bin)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generic_ok() {
        let meta: ResponseMeta = serde_json::from_str(r#"{"ok": true}"#).unwrap();
        assert!(meta.is_ok());
        assert!(meta.entries().is_none());
    }

    #[test]
    fn parses_ls_entries() {
        let json = r#"{"ok": true, "entries": [{"n": "boot.cfg", "t": "f", "s": 42}]}"#;
        let meta: ResponseMeta = serde_json::from_str(json).unwrap();
        let entries = meta.entries().expect("entries variant");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].n, "boot.cfg");
        assert_eq!(entries[0].t, EntryKind::File);
        assert_eq!(entries[0].s, 42);
    }

    #[test]
    fn parses_get_transfer_with_bin() {
        let meta: ResponseMeta =
            serde_json::from_str(r#"{"ok": true, "eof": false, "bin": 1024}"#).unwrap();
        assert_eq!(meta.transfer(), Some((false, Some(1024))));
    }

    #[test]
    fn parses_get_transfer_eof_without_bin() {
        let meta: ResponseMeta = serde_json::from_str(r#"{"ok": true, "eof": true}"#).unwrap();
        assert_eq!(meta.transfer(), Some((true, None)));
    }

    #[test]
    fn parses_error() {
        let meta: ResponseMeta =
            serde_json::from_str(r#"{"ok": false, "err": "no_such_file"}"#).unwrap();
        assert!(!meta.is_ok());
        assert_eq!(meta.err(), Some("no_such_file"));
    }

    #[test]
    fn ignores_unknown_keys() {
        let meta: ResponseMeta =
            serde_json::from_str(r#"{"ok": true, "firmware": "2.1.0"}"#).unwrap();
        assert!(meta.is_ok());
    }
}
