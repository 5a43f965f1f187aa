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

pub mod allotment;
pub mod exams;
pub mod rooms;
pub mod staff;

use super::{Room, Schedule};
use std::fmt::Write;

/// Format the calculated seating plan into a human readable String (e.g. to print it to
/// stdout).
///
/// The output format will look like
/// ```text
/// ===== F101 (60 seats) =====
/// - CS F111 Data Structures: 60 seats (FULL) at 01-05-2024|09:30|12:30
///
/// ===== F102 (40 seats) =====
/// …
/// ```
pub fn format_seating_plan(rooms: &[Room], schedule: &Schedule) -> String {
    let mut result = String::new();
    for room in rooms {
        write!(result, "\n===== {} ({} seats) =====\n", room.number, room.capacity).unwrap();
        for allotment in room.allotments.iter() {
            let course = &schedule.courses[allotment.course];
            writeln!(
                result,
                "- {} {}: {} seats ({}) at {}",
                course.code,
                course.name,
                allotment.seats_alloted,
                allotment.remarks,
                schedule.slots[allotment.slot],
            )
            .unwrap();
        }
    }

    result
}

pub fn debug_list_of_courses(schedule: &Schedule) -> String {
    schedule
        .courses
        .iter()
        .map(|c| format!("{:02} {} {} ({})", c.index, c.code, c.name, c.strength))
        .collect::<Vec<String>>()
        .join("\n")
}

/// Assert that a parsed schedule is consistent (in terms of object's indexes and cross
/// referencing indexes)
pub fn assert_data_consistency(schedule: &Schedule) {
    assert_eq!(
        schedule.by_slot.len(),
        schedule.slots.len(),
        "Schedule has {} slots but {} per-slot course lists",
        schedule.slots.len(),
        schedule.by_slot.len()
    );
    for (i, c) in schedule.courses.iter().enumerate() {
        assert_eq!(i, c.index, "Index of {}. course is {}", i, c.index);
        assert!(
            c.slot < schedule.slots.len(),
            "Slot {} of {}. course is invalid",
            c.slot,
            i
        );
    }
    for (s, course_indexes) in schedule.by_slot.iter().enumerate() {
        for pair in course_indexes.windows(2) {
            assert!(
                schedule.courses[pair[0]].strength >= schedule.courses[pair[1]].strength,
                "Courses of slot {} are not sorted by descending strength",
                s
            );
        }
        for &c in course_indexes {
            assert!(c < schedule.courses.len(), "Course {} of slot {} is invalid", c, s);
            assert_eq!(
                schedule.courses[c].slot, s,
                "Course {} is listed under slot {} but belongs to slot {}",
                c, s, schedule.courses[c].slot
            );
        }
    }
    let listed: usize = schedule.by_slot.iter().map(|v| v.len()).sum();
    assert_eq!(
        listed,
        schedule.courses.len(),
        "{} courses exist but {} are listed in slots",
        schedule.courses.len(),
        listed
    );
}
