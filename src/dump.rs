use std::io::Write;

use ahash::AHashMap;
use log::info;

use crate::error::Result;
use crate::event::Event;

/// Print every event and return the total number of elements per collection
pub fn dump_events<I, W>(events: I, mut out: W) -> Result<AHashMap<String, usize>>
where
    I: IntoIterator<Item = Result<Event>>,
    W: Write,
{
    let mut totals: AHashMap<String, usize> = AHashMap::new();
    let mut nevents = 0;
    for ev in events {
        let ev = ev?;
        writeln!(out, "{ev}")?;
        for (name, coll) in &ev.collections {
            *totals.entry(name.clone()).or_default() += coll.len();
        }
        nevents += 1;
    }
    out.flush()?;
    let mut names: Vec<_> = totals.keys().collect();
    names.sort();
    info!("Dumped {nevents} events");
    for name in names {
        info!("  {name}: {} elements", totals[name]);
    }
    Ok(totals)
}
