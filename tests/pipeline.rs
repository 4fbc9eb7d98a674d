use std::fs;
use std::io::Write;
use std::path::Path;

use approx::assert_relative_eq;
use pfodiag::{
    analysis::{ElectronComparison, Variant, PFO_ETA_HIST, RESOLUTION_HIST, TRUTH_ETA_HIST},
    output::OutputFormat,
    reader::EventReader,
    track_eff::{files_in_dir, run_files, EFFICIENCY_HIST},
    Config,
};
use serde_json::{json, Value};

fn electron_event(number: i32, truth: [f64; 3], pfo: [f64; 3]) -> Value {
    json!({
        "run": 1,
        "number": number,
        "collections": {
            "MCParticle": {
                "type": "MCParticle",
                "elements": [
                    {"pdg": 11, "generator_status": 1, "momentum": truth, "charge": -1.0},
                    {"pdg": 22, "generator_status": 1, "momentum": [10.0, 10.0, 10.0]}
                ]
            },
            "PandoraPFOCollection": {
                "type": "ReconstructedParticle",
                "elements": [
                    {"type": 11, "momentum": pfo, "energy": 5.0},
                    {"type": 2112, "momentum": [0.0, 3.0, 0.0]}
                ]
            }
        }
    })
}

fn write_events(path: &Path, events: &[Value]) {
    let mut file = fs::File::create(path).unwrap();
    for ev in events {
        writeln!(file, "{ev}").unwrap();
    }
}

fn sample(path: &Path) {
    write_events(
        path,
        &[
            electron_event(1, [3., 4., 0.], [3., 4., 1.]),
            // below the pT threshold
            electron_event(2, [0.5, 0., 2.], [0.5, 0., 2.]),
            electron_event(3, [0., 2., -2.], [0., 1.8, -2.]),
        ],
    );
}

#[test]
fn eta_histos() {
    let dir = tempfile::tempdir().unwrap();
    let infile = dir.path().join("events.jsonl");
    let outfile = dir.path().join("histos.json");
    sample(&infile);

    let events = EventReader::open(&infile, None).unwrap();
    let hists = ElectronComparison::new(&Config::default(), Variant::EtaHistos)
        .unwrap()
        .run(events)
        .unwrap();
    hists
        .write_to_file(&outfile, OutputFormat::from_path(&outfile))
        .unwrap();

    let json: Value = serde_json::from_slice(&fs::read(&outfile).unwrap()).unwrap();
    let hists = json["histograms"].as_array().unwrap();
    assert_eq!(hists.len(), 2);
    assert_eq!(hists[0]["name"], TRUTH_ETA_HIST);
    assert_eq!(hists[1]["name"], PFO_ETA_HIST);
    assert_eq!(hists[0]["entries"], 2);
    assert_eq!(hists[0]["axis"]["nbins"], 100);
    // truth η = 0 and η = -asinh(1) = -0.881
    let sumw = hists[0]["sumw"].as_array().unwrap();
    assert_eq!(sumw[51], 1.);
    assert_eq!(sumw[42], 1.);
}

#[test]
fn diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let infile = dir.path().join("events.jsonl");
    let outfile = dir.path().join("histos.yoda");
    sample(&infile);

    let events = EventReader::open(&infile, None).unwrap();
    let hists = ElectronComparison::new(&Config::default(), Variant::Diagnostics)
        .unwrap()
        .run(events)
        .unwrap();
    let res = hists.get_2d(RESOLUTION_HIST).unwrap();
    assert_eq!(res.entries(), 3);
    assert_eq!(res.integral(), 3.);
    let pfo_eta = hists.get_1d(PFO_ETA_HIST).unwrap();
    assert_eq!(pfo_eta.entries(), 2);
    assert_relative_eq!(
        pfo_eta.mean(),
        0.5 * ((1f64 / 5.).asinh() - (2f64 / 1.8).asinh()),
        epsilon = 1e-12
    );

    hists
        .write_to_file(&outfile, OutputFormat::from_path(&outfile))
        .unwrap();
    let yoda = fs::read_to_string(&outfile).unwrap();
    assert!(yoda.contains("BEGIN YODA_HISTO1D_V2 /truthElectronEtaHist"));
    assert!(yoda.contains("BEGIN YODA_HISTO2D_V2 /resPT"));
}

#[test]
fn broken_input() {
    let dir = tempfile::tempdir().unwrap();
    let infile = dir.path().join("events.jsonl");
    fs::write(
        &infile,
        format!("{}\nnot json\n", electron_event(1, [1., 1., 1.], [1., 1., 1.])),
    )
    .unwrap();
    let events = EventReader::open(&infile, None).unwrap();
    let res = ElectronComparison::new(&Config::default(), Variant::EtaHistos)
        .unwrap()
        .run(events);
    let err = res.unwrap_err();
    assert!(err.to_string().contains("line 2"), "{err}");
}

fn track_event(number: i32) -> Value {
    // one charged pion along (1, 0, 1), one track along it and one fake
    let tan_lambda = 1.;
    json!({
        "number": number,
        "collections": {
            "MCParticle": {
                "type": "MCParticle",
                "elements": [
                    {"pdg": 211, "generator_status": 1, "momentum": [1.0, 0.0, 1.0], "charge": 1.0},
                    {"pdg": -211, "generator_status": 1, "momentum": [0.0, -2.0, 0.0], "charge": -1.0}
                ]
            },
            "Tracks": {
                "type": "Track",
                "elements": [
                    {"phi": 0.0, "tan_lambda": tan_lambda},
                    {"phi": 1.0, "tan_lambda": -3.0}
                ]
            }
        }
    })
}

#[test]
fn track_efficiency_file_sets() {
    let dir = tempfile::tempdir().unwrap();
    let set = dir.path().join("sample");
    fs::create_dir(&set).unwrap();
    for n in 0..3 {
        write_events(&set.join(format!("events{n}.jsonl")), &[track_event(2 * n), track_event(2 * n + 1)]);
    }

    let files = files_in_dir(&set).unwrap();
    assert_eq!(files.len(), 3);
    assert!(files[0].ends_with("events0.jsonl"));

    let hists = run_files(&Config::default(), &files, None, Some(2), true, "sample/").unwrap();
    let true_eta = hists.get_1d("sample/trueEtaHist").unwrap();
    // two files with two events each, two candidates per event
    assert_eq!(true_eta.entries(), 8);
    let track_eta = hists.get_1d("sample/trackEtaHist").unwrap();
    assert_eq!(track_eta.entries(), 4);
    let eff = hists.get_1d(&format!("sample/{EFFICIENCY_HIST}")).unwrap();
    let bin = eff.axis.find_bin(1f64.asinh());
    assert_relative_eq!(eff.content(bin), 1.);
    assert_eq!(eff.content(eff.axis.find_bin(0.)), 0.);
}
