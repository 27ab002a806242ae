//! Application entry point and dispatch.

use std::fmt::Display;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use segfit_memory::constants::{LARGE_PAYLOAD, SMALL_PAYLOAD};
use segfit_memory::{ArenaError, SegregatedArena};

use crate::config::{AppConfig, Command};
use crate::report::{DemoReport, ExhaustReport, LayoutReport};

/// Run the application.
pub fn run(config: &AppConfig) -> Result<()> {
    let arena_config = config
        .arena_config()
        .context("building arena configuration")?;
    let mut arena = SegregatedArena::new(arena_config);
    debug!(?arena, "arena ready");

    match config.command() {
        Command::Demo => emit(config, &run_demo(&mut arena)?),
        Command::Layout => emit(config, &LayoutReport::from_arena(&arena)),
        Command::Exhaust { size } => emit(config, &run_exhaust(&mut arena, size)?),
    }
}

/// The scenario of the reference program: one small and one large block,
/// both released, then a small block again.
pub fn run_demo(arena: &mut SegregatedArena) -> Result<DemoReport> {
    let small = arena.allocate(usize::from(SMALL_PAYLOAD))?;
    let large = arena.allocate(usize::from(LARGE_PAYLOAD))?;
    info!(%small, %large, "allocated");

    arena.release(small)?;
    arena.release(large)?;

    let again = arena.allocate(usize::from(SMALL_PAYLOAD))?;
    Ok(DemoReport {
        small_offset: small.payload_offset(),
        large_offset: large.payload_offset(),
        reallocated_offset: again.payload_offset(),
        reused: again.block_offset() == small.block_offset(),
        stats: arena.stats(),
    })
}

/// Allocate `size` until the class runs out, then try one allocation of every
/// other class.
pub fn run_exhaust(arena: &mut SegregatedArena, size: usize) -> Result<ExhaustReport> {
    let mut held = Vec::new();
    let class = loop {
        match arena.allocate(size) {
            Ok(handle) => held.push(handle),
            Err(ArenaError::OutOfMemory { size }) => break size,
            Err(err) => return Err(err.into()),
        }
    };
    info!(size = class, allocated = held.len(), "class exhausted");

    let others: Vec<u8> = arena
        .config()
        .size_classes()
        .iter()
        .copied()
        .filter(|&other| other != class)
        .collect();
    let others_available = others
        .into_iter()
        .map(|other| (other, arena.allocate(usize::from(other)).is_ok()))
        .collect();

    Ok(ExhaustReport {
        size: class,
        allocated: held.len(),
        others_available,
        stats: arena.stats(),
    })
}

fn emit<T: Serialize + Display>(config: &AppConfig, report: &T) -> Result<()> {
    let text = if config.json {
        let mut json = serde_json::to_string_pretty(report)?;
        json.push('\n');
        json
    } else {
        report.to_string()
    };

    match &config.output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("writing report to {}", path.display())),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use segfit_memory::ArenaConfig;

    use super::*;

    #[test]
    fn demo_reuses_the_small_block() {
        let mut arena = SegregatedArena::default();
        let report = run_demo(&mut arena).unwrap();
        assert!(report.reused);
        assert_eq!(report.small_offset, report.reallocated_offset);
        assert_ne!(report.small_offset, report.large_offset);
        assert_eq!(report.stats.allocations, 3);
        assert_eq!(report.stats.releases, 2);
    }

    #[test]
    fn exhaust_large_keeps_small_available() {
        let mut arena = SegregatedArena::default();
        let report = run_exhaust(&mut arena, 180).unwrap();
        assert_eq!(report.allocated, 20);
        assert_eq!(report.others_available, vec![(15, true)]);
        assert_eq!(report.stats.out_of_memory, 1);
    }

    #[test]
    fn exhaust_rejects_unknown_size() {
        let mut arena = SegregatedArena::default();
        let err = run_exhaust(&mut arena, 99).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ArenaError>(),
            Some(&ArenaError::InvalidSize { requested: 99 })
        );
    }

    #[test]
    fn demo_fails_without_reference_classes() {
        let mut arena = SegregatedArena::new(ArenaConfig::new(1024, vec![8, 64]).unwrap());
        let err = run_demo(&mut arena).unwrap_err();
        assert!(err.downcast_ref::<ArenaError>().is_some_and(ArenaError::is_misuse));
    }
}
