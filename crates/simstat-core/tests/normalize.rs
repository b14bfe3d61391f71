use serde_json::Value;
use simstat_core::{
    normalize_file, normalize_files, parse_extra, OutputLayout, SimstatError, SimulatorKind,
    StatisticsAssembler, TypedValue,
};
use std::fs;
use std::path::{Path, PathBuf};

const GEM5_STATS: &str = "
---------- Begin Simulation Statistics ----------
simSeconds                                     0.000052                       # Number of seconds simulated (Second)
simInsts                                         200000                       # Number of instructions simulated (Count)
hostSeconds                                        0.50                       # Real time elapsed on the host (Second)
board.processor.start0.core.numCycles            400000                       # Number of cpu cycles simulated (Cycle)
board.processor.start0.core.ipc                0.500000                       # IPC: instructions per cycle ((Count/Cycle))
board.cache_hierarchy.ruby_system.l1_controllers0.L1Icache.m_demand_accesses         1000                       # Number of cache demand accesses (Count)
board.cache_hierarchy.ruby_system.l1_controllers0.L1Icache.m_demand_misses             10                       # Number of cache demand misses (Count)
board.cache_hierarchy.ruby_system.l1_controllers1.L1Icache.m_demand_accesses            0                       # Number of cache demand accesses (Count)
board.cache_hierarchy.ruby_system.l1_controllers1.L1Icache.m_demand_misses              0                       # Number of cache demand misses (Count)
board.cache_hierarchy.ruby_system.l1_controllers0.L1Dcache.m_demand_accesses          600                       # Number of cache demand accesses (Count)
board.cache_hierarchy.ruby_system.l1_controllers0.L1Dcache.m_demand_misses            100                       # Number of cache demand misses (Count)
board.cache_hierarchy.ruby_system.l1_controllers1.L1Dcache.m_demand_accesses          200                       # Number of cache demand accesses (Count)
board.cache_hierarchy.ruby_system.l1_controllers1.L1Dcache.m_demand_misses             30                       # Number of cache demand misses (Count)
board.cache_hierarchy.ruby_system.l2_controllers.L2cache.m_demand_accesses            140                       # Number of cache demand accesses (Count)
board.cache_hierarchy.ruby_system.l2_controllers.L2cache.m_demand_misses               70                       # Number of cache demand misses (Count)
board.processor.start0.core.statIssuedInstType_0::IntAlu      120     80.00%     80.00% # Number of instructions issued per FU type, per thread (Count)
board.processor.start0.core.branchPred.BTBHitRatio          nan                       # BTB Hit Ratio (Ratio)

---------- End Simulation Statistics   ----------
";

const ZSIM_OUT: &str = "# zsim stats
===
root: # Stats
 contention: # Contention simulation stats
  domain-0: # Domain stats
   time: 123456 # Weave simulation time
 time: # Simulator time breakdown
  init: 1000
  bound: 2000
  weave: 3000
 skylake: # Core stats
  skylake-0: # Core stats
   cycles: 4000 # Simulated unhalted cycles
   instrs: 10000 # Simulated instructions
 l1i: # L1 caches
  l1i-0: # Filter cache stats
   fhGETS: 500 # Filtered GETS hits
   fhGETX: 0 # Filtered GETX hits
   hGETS: 400 # GETS hits
   hGETX: 0 # GETX I->M hits
   mGETS: 100 # GETS misses
   mGETXIM: 0 # GETX I->M misses
   mGETXSM: 0 # GETX S->M misses (upgrade misses)
 l1d: # L1 caches
  l1d-0: # Filter cache stats
   fhGETS: 300
   fhGETX: 100
   hGETS: 50
   hGETX: 30
   mGETS: 15
   mGETXIM: 4
   mGETXSM: 1
 l2: # L2 caches
  l2-0: # Cache stats
   hGETS: 10
   hGETX: 2
   mGETS: 6
   mGETXIM: 1
   mGETXSM: 1
";

const SNIPER_OUT: &str = "                               | Core 0
  Instructions                 |    148455
  Cycles                       |    197900
  IPC                          |      0.75
  Time (ns)                    |     74214
Branch predictor stats         |
  num incorrect                |      3089
  misprediction rate           |    12.27%
Cache Summary                  |
  Cache L1-I                   |
    num cache accesses         |     20839
    num cache misses           |       403
    miss rate                  |     1.93%
    mpki                       |      2.71
  Cache L1-D                   |
    num cache accesses         |     51020
    num cache misses           |      1204
    miss rate                  |     2.36%
    mpki                       |      8.11
  Cache L2                     |
    num cache accesses         |      1607
    num cache misses           |       664
    miss rate                  |    41.32%
    mpki                       |      4.47
DRAM summary                   |
  num dram accesses            |       664
";

fn fixture(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

fn assemble(kind: SimulatorKind, path: &Path, extras: &[&str]) -> Value {
    let doc = normalize_file(kind.profile(), path).unwrap();
    let extras = extras.iter().map(|raw| parse_extra(raw).unwrap());
    let text = StatisticsAssembler::new(kind.profile())
        .extras(extras)
        .assemble(doc)
        .unwrap();
    serde_json::from_str(&text).unwrap()
}

fn assert_close(value: &Value, expected: f64) {
    let actual = value.as_f64().unwrap_or(f64::NAN);
    assert!((actual - expected).abs() < 1e-6, "{actual} != {expected}");
}

#[test]
fn gem5_stats_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), "stats.txt", GEM5_STATS);
    let json = assemble(SimulatorKind::Gem5, &path, &[]);

    assert_eq!(json["Instructions"], 200000);
    assert_eq!(json["Cycles"], 400000);
    assert_eq!(json["IPC"], 0.5);
    assert_close(&json["Time (ns)"], 52000.0);
    assert_close(&json["HostNanoseconds"], 5e8);

    let caches = &json["Cache Summary"];
    assert_eq!(caches["Cache L1-I"]["num cache accesses"], 1000);
    assert_eq!(caches["Cache L1-I"]["num cache misses"], 10);
    assert_eq!(caches["Cache L1-I"]["miss rate"], "1.00%");
    assert_eq!(caches["Cache L1-I"]["mpki"], 0.05);
    assert_eq!(caches["Cache L1-D"]["num cache accesses"], 800);
    assert_eq!(caches["Cache L1-D"]["num cache misses"], 130);
    assert_eq!(caches["Cache L1-D"]["miss rate"], "16.25%");
    assert_eq!(caches["Cache L1-D"]["mpki"], 0.65);
    assert_eq!(caches["Cache L2"]["miss rate"], "50.00%");
    assert_eq!(caches["Cache L2"]["mpki"], 0.35);
}

#[test]
fn gem5_host_time_from_the_orchestrator_is_kept_as_given() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), "stats.txt", GEM5_STATS);
    let json = assemble(SimulatorKind::Gem5, &path, &[r#""HostNanoseconds" : 987654321"#]);
    assert_eq!(json["HostNanoseconds"], 987654321);
}

#[test]
fn zsim_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), "zsim.out", ZSIM_OUT);
    let json = assemble(SimulatorKind::Zsim, &path, &[]);

    assert_eq!(json["Instructions"], 10000);
    assert_eq!(json["Cycles"], 4000);
    assert_eq!(json["IPC"], 2.5);
    assert_eq!(json["Time (ns)"], 123456);
    assert_eq!(json["HostNanoseconds"], 6000);

    let caches = &json["Cache Summary"];
    assert_eq!(caches["Cache L1-I"]["num cache accesses"], 1000);
    assert_eq!(caches["Cache L1-I"]["num cache misses"], 100);
    assert_eq!(caches["Cache L1-I"]["miss rate"], "10.00%");
    assert_eq!(caches["Cache L1-I"]["mpki"], 10.0);
    assert_eq!(caches["Cache L1-D"]["num cache accesses"], 500);
    assert_eq!(caches["Cache L1-D"]["num cache misses"], 20);
    assert_eq!(caches["Cache L1-D"]["miss rate"], "4.00%");
    assert_eq!(caches["Cache L2"]["num cache accesses"], 20);
    assert_eq!(caches["Cache L2"]["num cache misses"], 8);
    assert_eq!(caches["Cache L2"]["miss rate"], "40.00%");
    assert_eq!(caches["Cache L2"]["mpki"], 0.8);
}

#[test]
fn sniper_output_file_with_host_time() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), "sim.out", SNIPER_OUT);
    let json = assemble(SimulatorKind::Sniper, &path, &[r#""HostNanoseconds" : 5306398462"#]);

    let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["Cache Summary", "Cycles", "HostNanoseconds", "IPC", "Instructions", "Time (ns)"]
    );
    assert_eq!(json["HostNanoseconds"], 5306398462_i64);
    assert_eq!(json["IPC"], 0.75);
    assert_eq!(json["Cache Summary"]["Cache L2"]["miss rate"], "41.32%");
    assert_eq!(json["Cache Summary"]["Cache L1-D"]["mpki"], 8.11);
    assert_eq!(json["Cache Summary"]["Cache L1-I"]["num cache misses"], 403);
}

#[test]
fn flat_layout_keeps_dotted_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), "sim.out", SNIPER_OUT);
    let doc = normalize_file(SimulatorKind::Sniper.profile(), &path).unwrap();
    let text = StatisticsAssembler::new(SimulatorKind::Sniper.profile())
        .layout(OutputLayout::Flat)
        .assemble(doc)
        .unwrap();
    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["Cache Summary.Cache L1-I.num cache accesses"], 20839);
    assert!(json.get("Cache Summary").is_none());
}

#[test]
fn unparsable_value_aborts_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), "zsim.out", "root:\n l1d:\n  mGETS: 1O0\n");
    match normalize_file(SimulatorKind::Zsim.profile(), &path).unwrap_err() {
        SimstatError::Value { key, line, source } => {
            assert_eq!(key, "mGETS");
            assert_eq!(line, 3);
            assert_eq!(source.raw, "1O0");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn files_are_normalized_independently() {
    let dir = tempfile::tempdir().unwrap();
    let good = fixture(dir.path(), "run1.out", ZSIM_OUT);
    let missing = dir.path().join("run2.out");
    let results = normalize_files(SimulatorKind::Zsim.profile(), &[good, missing]);

    assert_eq!(results.len(), 2);
    let doc = results[0].as_ref().unwrap();
    assert_eq!(doc.get("Instructions"), Some(&TypedValue::Integer(10000)));
    assert!(matches!(results[1], Err(SimstatError::Read { .. })));
}

#[test]
fn output_is_byte_identical_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(dir.path(), "zsim.out", ZSIM_OUT);
    let render = || {
        let doc = normalize_file(SimulatorKind::Zsim.profile(), &path).unwrap();
        StatisticsAssembler::new(SimulatorKind::Zsim.profile())
            .assemble(doc)
            .unwrap()
    };
    assert_eq!(render(), render());
}
