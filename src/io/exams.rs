// Copyright 2024 by the examplan developers
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except in compliance with
// the License. You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied. See the License for the
// specific language governing permissions and limitations under the License.

//! IO functionality for reading the examination schedule from a CSV file and grouping its
//! courses by time slot.

use crate::{Course, Schedule, TimeSlot};
use chrono::{NaiveDate, NaiveTime};
use log::debug;
use serde::Deserialize;
use std::cmp::Reverse;

const DATE_FORMAT: &str = "%d-%m-%Y";
const TIME_FORMAT: &str = "%H:%M";

/// One line of the exam schedule file:
/// `course_code,course_name,strength,date,start_time,end_time`, no header row
#[derive(Deserialize, Debug)]
struct ExamRecord {
    code: String,
    name: String,
    strength: i64,
    date: String,
    start_time: String,
    end_time: String,
}

/// Check that the time slot components of a record parse as date and times. The components are
/// kept as strings afterwards; parsing is validation only.
fn validate_time_slot(record: &ExamRecord) -> Result<(), String> {
    let valid = NaiveDate::parse_from_str(&record.date, DATE_FORMAT).is_ok()
        && NaiveTime::parse_from_str(&record.start_time, TIME_FORMAT).is_ok()
        && NaiveTime::parse_from_str(&record.end_time, TIME_FORMAT).is_ok();
    if valid {
        Ok(())
    } else {
        Err(format!(
            "Invalid date format for course {}: ensure the format is date (DD-MM-YYYY), \
             start time (HH:MM), end time (HH:MM); example: 29-08-2019,15:00,18:00",
            record.code
        ))
    }
}

/// Read the examination schedule from a headerless CSV file.
///
/// Time slots are collected in order of first appearance, courses keep their file order, and
/// each slot's course list is sorted by descending strength (stable, so equal strengths keep
/// their file order). Courses with a strength of zero or less are dropped before packing.
///
/// # Errors
///
/// Fails with a string error message to be displayed to the user, if a row is malformed (wrong
/// field count, non-integer strength) or its date/time components do not parse.
pub fn read<R: std::io::Read>(reader: R) -> Result<Schedule, String> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut schedule = Schedule::default();
    for (i, record) in csv_reader.deserialize().enumerate() {
        let record: ExamRecord = record.map_err(|e| {
            format!(
                "Malformed exam schedule row in line {}: {} (expected \
                 `course_code,course_name,strength,date,start_time,end_time`)",
                i + 1,
                e
            )
        })?;
        validate_time_slot(&record)?;

        if record.strength <= 0 {
            debug!(
                "Dropping course {} with strength {} from the schedule",
                record.code, record.strength
            );
            continue;
        }

        let slot = TimeSlot {
            date: record.date,
            start_time: record.start_time,
            end_time: record.end_time,
        };
        let slot_index = match schedule.slot_index(&slot) {
            Some(index) => index,
            None => {
                schedule.slots.push(slot);
                schedule.by_slot.push(Vec::new());
                schedule.slots.len() - 1
            }
        };

        let index = schedule.courses.len();
        schedule.courses.push(Course {
            index,
            code: record.code.trim_start_matches('\u{feff}').to_owned(),
            name: record.name,
            strength: record.strength as u32,
            slot: slot_index,
        });
        schedule.by_slot[slot_index].push(index);
    }

    // Largest course first within each slot; the sort is stable, so ties keep file order
    let Schedule {
        courses, by_slot, ..
    } = &mut schedule;
    for course_indexes in by_slot.iter_mut() {
        course_indexes.sort_by_key(|&c| Reverse(courses[c].strength));
    }

    Ok(schedule)
}
