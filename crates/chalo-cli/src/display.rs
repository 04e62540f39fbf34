// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Chalo contributors

use chalo_core::{Itinerary, Stop};
use std::io::{self, Write};

pub fn write_stops<W: Write>(
    out: &mut W,
    stops: &[Stop],
    is_favorite: impl Fn(&str) -> bool,
) -> io::Result<()> {
    for (i, stop) in stops.iter().enumerate() {
        let star = if is_favorite(&stop.id) { "*" } else { " " };
        writeln!(
            out,
            "  {:>2}. {} {} [{}] {} min walk  (id: {})",
            i + 1,
            star,
            stop.name,
            stop.category,
            stop.walking_time_minutes,
            stop.id
        )?;
        if let Some(description) = &stop.description {
            writeln!(out, "        {}", description)?;
        }
    }
    Ok(())
}

pub fn write_itinerary<W: Write>(
    out: &mut W,
    itinerary: &Itinerary,
    is_favorite: impl Fn(&str) -> bool,
) -> io::Result<()> {
    writeln!(
        out,
        "{} ({} stops, {} min / {:.1} h)",
        itinerary.title,
        itinerary.stops.len(),
        itinerary.duration_minutes,
        itinerary.duration_hours()
    )?;
    if !itinerary.description.is_empty() {
        writeln!(out, "  {}", itinerary.description)?;
    }
    write_stops(out, &itinerary.stops, is_favorite)
}
