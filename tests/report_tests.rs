//! Report rendering, filtering and ordering

use memstat_core::config::CompileDirective;
use memstat_core::id::CompilerThreadId;
use memstat_core::method::MethodIdentity;
use memstat_core::symbol::SymbolTable;
use memstat_core::types::{ArenaTag, CompilerKind};
use memstat_exec::table::sort_by_size;
use memstat_exec::{
    Commit, CompileTask, CompilerThreadContext, ScopedTrackingGuard, StatTable, StatisticsService,
};
use memstat_mem::PeakSnapshot;

fn commit(total: usize) -> Commit {
    Commit {
        kind: CompilerKind::C2,
        peak: PeakSnapshot {
            total,
            ..Default::default()
        },
        time: 0.25,
        thread: CompilerThreadId::new(9),
    }
}

fn populated_service(symbols: &SymbolTable, sizes: &[(&str, isize)]) -> StatisticsService {
    let service = StatisticsService::new();
    service.enable();
    let mut ctx = CompilerThreadContext::new();
    for (name, size) in sizes {
        let method = MethodIdentity::intern(symbols, "Demo", name, "()V");
        ctx.set_task(CompileTask::new(method, CompilerKind::C1, CompileDirective::collect()));
        {
            let mut guard = ScopedTrackingGuard::new(&service, &mut ctx);
            guard.on_arena_change(*size, ArenaTag::Resource);
            guard.on_arena_change(-*size, ArenaTag::Resource);
        }
        ctx.clear_task();
    }
    service
}

fn render(service: &StatisticsService, human: bool, min_size: usize) -> String {
    let mut out = Vec::new();
    service.report(&mut out, human, min_size).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn disabled_service_reports_unavailable() {
    let service = StatisticsService::new();
    assert_eq!(
        render(&service, false, 0),
        "Compilation memory statistics\n(unavailable)\n"
    );
}

#[test]
fn empty_table_reports_no_entries() {
    let service = StatisticsService::new();
    service.enable();
    let text = render(&service, false, 0);
    assert!(text.starts_with("Compilation memory statistics\n\nLegend:\n"));
    assert!(text.contains(
        "total     NA        RA        #nodes  time    type  #rc thread              method\n"
    ));
    assert!(text.ends_with("No entries.\n"));
    assert!(!text.contains("cutoff"));
}

#[test]
fn rows_are_sorted_largest_first() {
    let symbols = SymbolTable::new();
    let service = populated_service(&symbols, &[("small", 10), ("large", 3000), ("mid", 200)]);
    let text = render(&service, false, 0);
    let rows: Vec<&str> = text
        .lines()
        .skip_while(|l| !l.starts_with("total "))
        .skip(1)
        .collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].starts_with("3000 ") && rows[0].ends_with("Demo::large(()V) "));
    assert!(rows[1].starts_with("200 ") && rows[1].ends_with("Demo::mid(()V) "));
    assert!(rows[2].starts_with("10 ") && rows[2].ends_with("Demo::small(()V) "));
}

#[test]
fn min_size_prints_cutoff_and_counts() {
    let symbols = SymbolTable::new();
    let service = populated_service(&symbols, &[("a", 100), ("b", 5000), ("c", 7000)]);
    let text = render(&service, false, 1000);
    assert!(text.contains(" (cutoff: 1000 bytes)\n"));
    assert!(text.contains("(2/3)\n"));
    assert!(!text.contains("Demo::a("));
}

#[test]
fn min_size_above_everything_yields_no_rows() {
    let symbols = SymbolTable::new();
    let service = populated_service(&symbols, &[("a", 100), ("b", 200)]);
    let text = render(&service, false, 1 << 30);
    assert!(text.contains("(0/2)\n"));
    assert!(text.ends_with("No entries.\n"));
}

#[test]
fn human_readable_uses_units() {
    let symbols = SymbolTable::new();
    let service = populated_service(&symbols, &[("big", 300 * 1024 * 1024)]);
    let text = render(&service, true, 0);
    assert!(text.lines().any(|l| l.starts_with("300M ")));
}

#[test]
fn json_report_matches_text_order() {
    let symbols = SymbolTable::new();
    let service = populated_service(&symbols, &[("x", 1), ("y", 3), ("z", 2)]);
    let json = service.report_json(2).unwrap();
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["method"], "Demo::y(()V)");
    assert_eq!(rows[0]["total"], 3);
    assert_eq!(rows[1]["method"], "Demo::z(()V)");
    assert_eq!(rows[1]["kind"], "c1");
}

#[test]
fn snapshot_returns_exactly_the_records_over_cutoff() {
    let symbols = SymbolTable::new();
    let mut table = StatTable::new();
    let totals = [5usize, 50, 500, 50, 0];
    for (i, total) in totals.iter().enumerate() {
        let m = MethodIdentity::intern(&symbols, "Snap", &format!("m{}", i), "()V");
        table.upsert(&m, &commit(*total));
    }
    for min in [0usize, 1, 50, 51, 501] {
        let mut got: Vec<usize> = table.snapshot(min).iter().map(|r| r.total()).collect();
        got.sort_unstable();
        let mut want: Vec<usize> = totals.iter().copied().filter(|t| *t >= min).collect();
        want.sort_unstable();
        assert_eq!(got, want, "min_size {}", min);
    }
    assert_eq!(table.snapshot(0).len(), table.len());
}

#[test]
fn sort_is_stable_and_non_increasing() {
    let symbols = SymbolTable::new();
    let mut table = StatTable::new();
    let names = ["a", "b", "c", "d", "e", "f"];
    let totals = [10usize, 30, 10, 20, 30, 10];
    let methods: Vec<MethodIdentity> = names
        .iter()
        .map(|n| MethodIdentity::intern(&symbols, "Sort", n, "()V"))
        .collect();
    for (m, t) in methods.iter().zip(totals) {
        table.upsert(m, &commit(t));
    }

    let mut order: Vec<_> = methods.iter().map(|m| table.get(m).unwrap()).collect();
    sort_by_size(&mut order);

    let sorted: Vec<String> = order.iter().map(|r| r.method().name().to_string()).collect();
    assert_eq!(sorted, ["b", "e", "d", "a", "c", "f"]);
    assert!(order.windows(2).all(|w| w[0].total() >= w[1].total()));
}
