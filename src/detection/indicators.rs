use crate::core::{EventKind, LogRecord};

/// Locations treated as hostile. Exact, case-sensitive match.
pub const DENYLISTED_LOCATIONS: &[&str] = &["North Korea", "Russia", "Iran", "China", "Syria"];

/// Fragments of known-bad process names. Matched against the lowercased name.
pub const DENYLISTED_PROCESSES: &[&str] = &[
    "ssh_brute",
    "mal_downloader",
    "worm.exe",
    "exploit",
    "scan",
    "crack",
    "mimikatz",
    "pwdump",
];

/// Fragments of known-bad download filenames. Matched against the lowercased name.
pub const DENYLISTED_FILE_PATTERNS: &[&str] = &[
    "exploit", "toolkit", "malware", "hack", "crack", "trojan", "worm", "virus", "ransom",
    "backdoor",
];

/// Protocol to risky destination ports. Protocol keys are case-sensitive.
pub const DENYLISTED_PORTS: &[(&str, &[i64])] = &[
    ("SMB", &[445]),
    ("Telnet", &[23]),
    ("RDP", &[3389]),
    ("SSH", &[22]),
];

/// Literal prefixes of private destination addresses.
pub const PRIVATE_PREFIXES: &[&str] = &["10.", "192.168.", "172.16."];

/// `bytes_received` above this counts as a large transfer.
pub const LARGE_TRANSFER_BYTES: i64 = 1_000_000;

/// Per-record severity strictly above this marks the record critical.
pub const CRITICAL_EVENT_THRESHOLD: f64 = 0.5;

/// Failed logins from one IP strictly above this count as brute force.
pub const BRUTE_FORCE_FAILURES: usize = 2;

pub fn has_denylisted_location(record: &LogRecord) -> bool {
    DENYLISTED_LOCATIONS.contains(&record.location())
}

/// Any denylisted fragment occurs in the lowercased process name.
pub fn has_process_fragment(record: &LogRecord) -> bool {
    let name = record.process_name().to_lowercase();
    DENYLISTED_PROCESSES.iter().any(|p| name.contains(p))
}

/// The lowercased process name is itself a denylist entry.
pub fn is_denylisted_process(record: &LogRecord) -> bool {
    let name = record.process_name().to_lowercase();
    DENYLISTED_PROCESSES.contains(&name.as_str())
}

/// A `file_download` whose lowercased filename contains a denylisted fragment.
pub fn is_malicious_download(record: &LogRecord) -> bool {
    if !record.is(EventKind::FileDownload) {
        return false;
    }
    let name = record.filename().to_lowercase();
    DENYLISTED_FILE_PATTERNS.iter().any(|p| name.contains(p))
}

pub fn is_risky_port(record: &LogRecord) -> bool {
    let port = record.destination_port();
    DENYLISTED_PORTS
        .iter()
        .any(|(protocol, ports)| *protocol == record.protocol() && ports.contains(&port))
}

pub fn targets_private_ip(record: &LogRecord) -> bool {
    let ip = record.destination_ip();
    PRIVATE_PREFIXES.iter().any(|p| ip.starts_with(p))
}

pub fn is_large_transfer(record: &LogRecord) -> bool {
    record.bytes_received() > LARGE_TRANSFER_BYTES
}
