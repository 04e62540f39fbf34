// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Chalo contributors

//! Line-oriented editing session over an [`ItineraryEditor`].

use crate::display::write_stops;
use chalo_core::{ItineraryEditor, KeyValueStore, SpotProvider, Stop, TripStore};
use std::io::{self, BufRead, Write};

const HELP: &str = "\
Commands:
  list                      show the current stops
  replace <stop-id>         another stop in the same category
  swap <stop-id>            a stop from a different category
  remove <stop-id>          drop a stop (at least one must remain)
  add <position> [category] insert a nearby spot after the given position
  location <name>           change the search location
  start                     start this itinerary as your trip
  quit                      leave without starting";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    List,
    Replace(String),
    Swap(String),
    Remove(String),
    /// `position` is 1-based, as listed
    Add {
        position: usize,
        category: Option<String>,
    },
    Location(String),
    Start,
    Quit,
    Help,
}

pub fn parse_edit_command(line: &str) -> Result<EditCommand, String> {
    let mut parts = line.split_whitespace();
    let verb = match parts.next() {
        Some(v) => v.to_lowercase(),
        None => return Err("Empty command".to_string()),
    };
    let rest: Vec<&str> = parts.collect();

    let stop_id = |usage: &str| match rest.as_slice() {
        [id] => Ok(id.to_string()),
        _ => Err(format!("Usage: {} <stop-id>", usage)),
    };

    match verb.as_str() {
        "list" | "ls" => Ok(EditCommand::List),
        "replace" | "refresh" => stop_id("replace").map(EditCommand::Replace),
        "swap" => stop_id("swap").map(EditCommand::Swap),
        "remove" | "rm" => stop_id("remove").map(EditCommand::Remove),
        "add" => {
            let (position, category) = rest
                .split_first()
                .ok_or_else(|| "Usage: add <position> [category]".to_string())?;
            let position = position
                .parse::<usize>()
                .ok()
                .filter(|p| *p >= 1)
                .ok_or_else(|| format!("Invalid position '{}'", position))?;
            let category = (!category.is_empty()).then(|| category.join(" "));
            Ok(EditCommand::Add { position, category })
        }
        "location" if !rest.is_empty() => Ok(EditCommand::Location(rest.join(" "))),
        "location" => Err("Usage: location <name>".to_string()),
        "start" | "commit" => Ok(EditCommand::Start),
        "quit" | "exit" | "q" => Ok(EditCommand::Quit),
        "help" | "?" => Ok(EditCommand::Help),
        other => Err(format!("Unknown command '{}'. Type 'help' for a list.", other)),
    }
}

/// Runs commands from `input` until `start`, `quit` or end of input.
/// Returns whether the itinerary was started as a trip.
pub fn run_session<R, W, S>(
    mut editor: ItineraryEditor,
    provider: &dyn SpotProvider,
    trips: &mut TripStore<S>,
    mut input: R,
    mut out: W,
) -> anyhow::Result<bool>
where
    R: BufRead,
    W: Write,
    S: KeyValueStore,
{
    writeln!(
        out,
        "Editing '{}' in {}. Type 'help' for commands.",
        editor.title(),
        editor.location()
    )?;
    write_editor(&mut out, &editor)?;

    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = read_line(&mut input)? else {
            editor.close();
            return Ok(false);
        };
        if line.is_empty() {
            continue;
        }

        let command = match parse_edit_command(&line) {
            Ok(c) => c,
            Err(msg) => {
                writeln!(out, "{}", msg)?;
                continue;
            }
        };

        let result = match command {
            EditCommand::List => {
                write_editor(&mut out, &editor)?;
                continue;
            }
            EditCommand::Help => {
                writeln!(out, "{}", HELP)?;
                continue;
            }
            EditCommand::Replace(id) => editor.replace_stop(provider, &id).map(|_| ()),
            EditCommand::Swap(id) => editor.replace_stop_category(provider, &id).map(|_| ()),
            EditCommand::Remove(id) => editor.remove_stop(&id).map(|_| ()),
            EditCommand::Location(location) => {
                editor.set_location(&location);
                writeln!(out, "Location set to {}.", editor.location())?;
                continue;
            }
            EditCommand::Add { position, category } => {
                let added = editor.add_stop_after(
                    provider,
                    position - 1,
                    category.as_deref(),
                    |candidates| pick_candidate(&mut input, &mut out, candidates),
                );
                match added {
                    Ok(None) => {
                        writeln!(out, "Nothing added.")?;
                        continue;
                    }
                    other => other.map(|_| ()),
                }
            }
            EditCommand::Start => {
                let itinerary = editor.commit(trips);
                writeln!(
                    out,
                    "Trip started: {} ({} stops, {} min)",
                    itinerary.title,
                    itinerary.stops.len(),
                    itinerary.duration_minutes
                )?;
                return Ok(true);
            }
            EditCommand::Quit => {
                editor.close();
                writeln!(out, "Left without starting a trip.")?;
                return Ok(false);
            }
        };

        match result {
            Ok(()) => write_editor(&mut out, &editor)?,
            Err(e) => {
                let message = editor
                    .error()
                    .map_or_else(|| e.user_message(), str::to_string);
                writeln!(out, "Error: {}", message)?;
            }
        }
    }
}

fn write_editor<W: Write>(out: &mut W, editor: &ItineraryEditor) -> io::Result<()> {
    write_stops(out, editor.stops(), |_| false)?;
    writeln!(out, "  Total: {} min", editor.duration_minutes())?;
    let excluded: Vec<&str> = editor.rotation().excluded().collect();
    if !excluded.is_empty() {
        writeln!(out, "  Recently swapped out: {}", excluded.join(", "))?;
    }
    Ok(())
}

fn pick_candidate<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    candidates: &[Stop],
) -> Option<usize> {
    match prompt_choice(input, out, candidates) {
        Ok(choice) => choice,
        Err(e) => {
            log::warn!("Failed to read candidate choice — error={}", e);
            None
        }
    }
}

fn prompt_choice<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    candidates: &[Stop],
) -> io::Result<Option<usize>> {
    if candidates.is_empty() {
        writeln!(out, "No spots available nearby.")?;
        return Ok(None);
    }
    write_stops(out, candidates, |_| false)?;
    write!(out, "Pick a number (blank to cancel): ")?;
    out.flush()?;
    Ok(read_line(input)?
        .and_then(|line| line.parse::<usize>().ok())
        .and_then(|n| n.checked_sub(1)))
}

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
