//! The six scoring rules.
//!
//! Each rule is a pure function from a batch to a sub-score in `[0, 1]`.
//! Contributions accumulate additively and are capped once, at the end of the
//! rule. An empty batch scores zero everywhere.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::indicators::{
    BRUTE_FORCE_FAILURES, CRITICAL_EVENT_THRESHOLD, has_denylisted_location, has_process_fragment,
    is_denylisted_process, is_large_transfer, is_malicious_download, is_risky_port,
    targets_private_ip,
};
use crate::core::{EventKind, LogRecord};

fn count(batch: &[LogRecord], pred: impl Fn(&LogRecord) -> bool) -> usize {
    batch.iter().filter(|r| pred(r)).count()
}

fn any_event(batch: &[LogRecord], kind: EventKind) -> bool {
    batch.iter().any(|r| r.is(kind))
}

/// `aco`: share of records from hostile locations, failed statuses, and
/// denylisted process fragments.
pub fn source_reputation(batch: &[LogRecord]) -> f64 {
    if batch.is_empty() {
        return 0.0;
    }
    let total = batch.len() as f64;
    let mut score = 0.0;

    let locations = count(batch, has_denylisted_location);
    if locations > 0 {
        score += 0.3 * (locations as f64 / total);
    }

    let failures = count(batch, LogRecord::is_failed);
    if failures > 0 {
        score += 0.3 * (failures as f64 / total);
    }

    let processes = count(batch, has_process_fragment);
    if processes > 0 {
        score += 0.4 * (processes as f64 / total);
    }

    debug!(locations, failures, processes, "aco indicators");
    f64::min(score, 1.0)
}

/// `pso`: lateral movement, large inbound transfers, malicious downloads.
pub fn active_threats(batch: &[LogRecord]) -> f64 {
    let mut score = 0.0;

    if any_event(batch, EventKind::LateralMovement) {
        debug!("pso: lateral movement present");
        score += 0.5;
    }
    if batch.iter().any(is_large_transfer) {
        debug!("pso: large transfer present");
        score += 0.4;
    }
    if batch.iter().any(is_malicious_download) {
        debug!("pso: malicious download present");
        score += 0.3;
    }

    f64::min(score, 1.0)
}

#[derive(Debug, Default)]
struct LoginAttempts {
    failed: usize,
    succeeded: usize,
}

/// `abc`: brute-force logins per source IP, exact denylisted process names,
/// and risky protocol/port pairs.
pub fn access_anomalies(batch: &[LogRecord]) -> f64 {
    let mut score = 0.0;

    let mut attempts: BTreeMap<&str, LoginAttempts> = BTreeMap::new();
    for record in batch.iter().filter(|r| r.is(EventKind::Login)) {
        let entry = attempts.entry(record.source_ip()).or_default();
        if record.is_failed() {
            entry.failed += 1;
        } else {
            entry.succeeded += 1;
        }
    }

    let brute_forcer = attempts
        .iter()
        .find(|(_, a)| a.failed > BRUTE_FORCE_FAILURES);
    if let Some((ip, a)) = brute_forcer {
        debug!(ip, failed = a.failed, succeeded = a.succeeded, "abc: brute force");
        score += 0.6;
    }

    if batch.iter().any(is_denylisted_process) {
        debug!("abc: denylisted process");
        score += 0.7;
    }

    if batch.iter().any(is_risky_port) {
        debug!("abc: risky protocol/port");
        score += 0.4;
    }

    f64::min(score, 1.0)
}

/// `firefly`: attack-chain correlation.
///
/// The base term is a priority chain over which of login, download and
/// lateral movement appear anywhere in the batch; only the first matching
/// combination counts. On top of it, every source IP that produced more than
/// one distinct event type adds `0.2` per distinct type. Records without a
/// source IP do not take part in the per-IP term.
pub fn attack_chain(batch: &[LogRecord]) -> f64 {
    let login = any_event(batch, EventKind::Login);
    let download = any_event(batch, EventKind::FileDownload);
    let lateral = any_event(batch, EventKind::LateralMovement);

    let mut score = match (login, download, lateral) {
        (true, true, true) => 0.8,
        (true, true, false) => 0.5,
        (false, true, true) => 0.6,
        (true, false, true) => 0.4,
        _ => 0.0,
    };

    let mut per_ip: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for record in batch {
        let ip = record.source_ip();
        if ip.is_empty() {
            continue;
        }
        per_ip.entry(ip).or_default().insert(record.event_type());
    }

    for (ip, kinds) in &per_ip {
        if kinds.len() > 1 {
            debug!(ip, distinct = kinds.len(), "firefly: multi-stage source");
            score += 0.2 * kinds.len() as f64;
        }
    }

    f64::min(score, 1.0)
}

/// Ad hoc severity of a single record, used to pick out critical events.
pub fn record_severity(record: &LogRecord) -> f64 {
    let mut severity = 0.0;
    if has_denylisted_location(record) {
        severity += 0.3;
    }
    if has_process_fragment(record) {
        severity += 0.4;
    }
    if is_malicious_download(record) {
        severity += 0.5;
    }
    if record.is(EventKind::LateralMovement) {
        severity += 0.6;
    }
    severity
}

/// `fss`: share of critical events, with a floor of `0.3` once any exist.
pub fn critical_events(batch: &[LogRecord]) -> f64 {
    let critical = count(batch, |r| record_severity(r) > CRITICAL_EVENT_THRESHOLD);
    if critical == 0 {
        return 0.0;
    }
    debug!(critical, total = batch.len(), "fss: critical events");
    f64::min(1.0, critical as f64 / batch.len() as f64 + 0.3)
}

/// `gwo`: internal targeting, malicious downloads, lateral movement.
pub fn internal_targeting(batch: &[LogRecord]) -> f64 {
    if batch.is_empty() {
        return 0.0;
    }
    let total = batch.len() as f64;
    let mut score = 0.0;

    let internal = count(batch, targets_private_ip);
    if internal > 0 {
        score += 0.2 * (internal as f64 / total);
    }

    let downloads = count(batch, is_malicious_download);
    if downloads > 0 {
        score += 0.4 * (downloads as f64 / total);
    }

    if any_event(batch, EventKind::LateralMovement) {
        score += 0.4;
    }

    debug!(internal, downloads, "gwo indicators");
    f64::min(score, 1.0)
}
