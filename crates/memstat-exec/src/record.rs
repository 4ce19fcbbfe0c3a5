//! `StatRecord`: the table entry for one compiled method, and its report row.

use std::io::Write;

use serde::Serialize;

use memstat_core::id::CompilerThreadId;
use memstat_core::method::MethodIdentity;
use memstat_core::types::CompilerKind;

use crate::table::Commit;

const K: usize = 1024;
const M: usize = K * K;
const G: usize = M * K;

/// Latest peak of one method. Each commit overwrites, nothing is merged.
#[derive(Debug, Clone)]
pub struct StatRecord {
    method: MethodIdentity,
    kind: CompilerKind,
    /// Seconds since the service started.
    time: f64,
    num_recomp: u32,
    /// Compiling thread, diagnostic only. The thread may be gone.
    thread: Option<CompilerThreadId>,

    total: usize,
    node_at_peak: usize,
    resource_at_peak: usize,
    live_nodes_at_peak: u32,
}

impl StatRecord {
    pub fn new(method: MethodIdentity) -> Self {
        Self {
            method,
            kind: CompilerKind::C1,
            time: 0.0,
            num_recomp: 0,
            thread: None,
            total: 0,
            node_at_peak: 0,
            resource_at_peak: 0,
            live_nodes_at_peak: 0,
        }
    }

    pub(crate) fn apply(&mut self, commit: &Commit) {
        self.time = commit.time;
        self.thread = Some(commit.thread);
        self.kind = commit.kind;
        self.num_recomp += 1;
        self.total = commit.peak.total;
        self.node_at_peak = commit.peak.node_bytes;
        self.resource_at_peak = commit.peak.resource_bytes;
        self.live_nodes_at_peak = commit.peak.live_nodes;
    }

    pub fn method(&self) -> &MethodIdentity {
        &self.method
    }

    pub fn kind(&self) -> CompilerKind {
        self.kind
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn recompilations(&self) -> u32 {
        self.num_recomp
    }

    pub fn thread(&self) -> Option<CompilerThreadId> {
        self.thread
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn node_at_peak(&self) -> usize {
        self.node_at_peak
    }

    pub fn resource_at_peak(&self) -> usize {
        self.resource_at_peak
    }

    pub fn live_nodes_at_peak(&self) -> u32 {
        self.live_nodes_at_peak
    }

    pub fn print_legend(out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "Legend:")?;
        writeln!(out, "  total  : memory allocated via arenas while compiling")?;
        writeln!(out, "  NA     : ...how much in node arenas (if c2)")?;
        writeln!(out, "  RA     : ...how much in resource areas")?;
        writeln!(out, "  #nodes : ...how many nodes (if c2)")?;
        writeln!(out, "  time   : time of last compilation (sec)")?;
        writeln!(out, "  type   : compiler type")?;
        writeln!(out, "  #rc    : how often recompiled")?;
        writeln!(out, "  thread : compiler thread")
    }

    pub fn print_header(out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            out,
            "total     NA        RA        #nodes  time    type  #rc thread              method"
        )
    }

    /// One report row, newline terminated.
    pub fn format_row(&self, human_readable: bool) -> String {
        let mut row = Row::default();

        for bytes in [self.total, self.node_at_peak, self.resource_at_peak] {
            if human_readable {
                row.push(&format!("{} ", proper_size(bytes)));
            } else {
                row.push(&format!("{} ", bytes));
            }
            row.pad(10);
        }

        row.push(&format!("{} ", self.live_nodes_at_peak));
        row.pad(8);

        row.push(&format!("{:.3} ", self.time));
        row.pad(8);

        row.push(&format!("{} ", self.kind));
        row.pad(6);

        row.push(&format!("{} ", self.num_recomp));
        row.pad(4);

        let thread = self.thread.map_or(0, CompilerThreadId::get);
        row.push(&format!("{:#018x}  ", thread));

        row.push(&format!("{} ", self.method));
        row.line.push('\n');
        row.line
    }

    pub fn print_on(&self, out: &mut dyn Write, human_readable: bool) -> std::io::Result<()> {
        out.write_all(self.format_row(human_readable).as_bytes())
    }

    pub fn to_view(&self) -> RecordView {
        RecordView {
            method: self.method.to_string(),
            total: self.total,
            node_at_peak: self.node_at_peak,
            resource_at_peak: self.resource_at_peak,
            live_nodes_at_peak: self.live_nodes_at_peak,
            time: self.time,
            kind: self.kind,
            recompilations: self.num_recomp,
            thread: self.thread,
        }
    }
}

/// Owned, serializable copy of a record for machine-readable reports.
#[derive(Debug, Clone, Serialize)]
pub struct RecordView {
    pub method: String,
    pub total: usize,
    pub node_at_peak: usize,
    pub resource_at_peak: usize,
    pub live_nodes_at_peak: u32,
    pub time: f64,
    pub kind: CompilerKind,
    pub recompilations: u32,
    pub thread: Option<CompilerThreadId>,
}

/// Line buffer that pads to cumulative column stops.
#[derive(Default)]
struct Row {
    line: String,
    col: usize,
}

impl Row {
    fn push(&mut self, s: &str) {
        self.line.push_str(s);
    }

    fn pad(&mut self, width: usize) {
        self.col += width;
        while self.line.len() < self.col {
            self.line.push(' ');
        }
    }
}

/// `150B`, `195K`, `300M`, `120G`: switches unit once the value reaches 100 of it.
pub fn proper_size(bytes: usize) -> String {
    let (value, unit) = if bytes >= 100 * G {
        (bytes / G, "G")
    } else if bytes >= 100 * M {
        (bytes / M, "M")
    } else if bytes >= 100 * K {
        (bytes / K, "K")
    } else {
        (bytes, "B")
    };
    format!("{}{}", value, unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use memstat_core::symbol::SymbolTable;
    use memstat_mem::PeakSnapshot;

    fn record() -> StatRecord {
        let symbols = SymbolTable::new();
        let mut r = StatRecord::new(MethodIdentity::intern(&symbols, "Foo", "bar", "(I)V"));
        r.apply(&Commit {
            kind: CompilerKind::C2,
            peak: PeakSnapshot {
                total: 150,
                node_bytes: 100,
                resource_bytes: 50,
                live_nodes: 7,
            },
            time: 1.5,
            thread: CompilerThreadId::new(3),
        });
        r
    }

    #[test]
    fn proper_size_units() {
        assert_eq!(proper_size(0), "0B");
        assert_eq!(proper_size(102_399), "102399B");
        assert_eq!(proper_size(100 * K), "100K");
        assert_eq!(proper_size(200 * M + 5), "200M");
        assert_eq!(proper_size(150 * G), "150G");
    }

    #[test]
    fn row_columns_line_up_with_header() {
        let row = record().format_row(false);
        assert_eq!(&row[0..10], "150       ");
        assert_eq!(&row[10..20], "100       ");
        assert_eq!(&row[20..30], "50        ");
        assert_eq!(&row[30..38], "7       ");
        assert_eq!(&row[38..46], "1.500   ");
        assert_eq!(&row[46..52], "c2    ");
        assert_eq!(&row[52..56], "1   ");
        assert_eq!(&row[56..76], "0x0000000000000003  ");
        assert_eq!(&row[76..], "Foo::bar((I)V) \n");
    }

    #[test]
    fn human_readable_row() {
        let row = record().format_row(true);
        assert!(row.starts_with("150B      100B      50B       7"));
    }

    #[test]
    fn wide_values_push_columns_right() {
        let symbols = SymbolTable::new();
        let mut r = StatRecord::new(MethodIdentity::intern(&symbols, "A", "b", "()V"));
        r.apply(&Commit {
            kind: CompilerKind::C1,
            peak: PeakSnapshot {
                total: 123_456_789_012,
                ..Default::default()
            },
            time: 0.0,
            thread: CompilerThreadId::new(1),
        });
        let row = r.format_row(false);
        assert!(row.starts_with("123456789012 0"));
    }
}
