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

//! The room allotment engines: packing course strengths into rooms for each time slot.
//!
//! Two packing modes are provided. `allot_rooms_single` seats one course per room and fills the
//! room list sequentially. `allot_rooms_double` splits every room into a LEFT and a RIGHT half
//! and walks the room list with two independent cursors, so two courses share a room; a
//! rebalance step after each course pulls fragmented tail allotments backwards, and a cleanup
//! step after each slot folds a trailing single-half "tongue" back into whole rooms.
//!
//! Neither packer reorders the room list: the caller decides the packing order (typically
//! largest room first). Courses within a slot are always processed largest strength first,
//! which the `Schedule` guarantees by construction.

use crate::{Allotment, Remarks, Room, Schedule};
use log::{debug, warn};
use std::cmp::min;

/// A course whose full strength could not be seated in the rooms available for its slot.
///
/// The allotments made up to the point of failure stay in place, so the exported plan reflects
/// the partial placement and the operator can remediate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shortfall {
    /// Index of the course in the schedule's course list
    pub course: usize,
    /// Index of the time slot in the schedule's slot list
    pub slot: usize,
    /// Seats that were placed before the rooms ran out
    pub seats_placed: u32,
}

/// Seat one course per room, filling rooms sequentially in the order of the room list.
///
/// For each time slot independently, courses are placed largest first into the remaining
/// capacity of the current room; the room pointer advances once a room is exhausted. Courses
/// that do not fit into the remaining rooms are reported as shortfalls and skipped.
pub fn allot_rooms_single(rooms: &mut [Room], schedule: &Schedule) -> Vec<Shortfall> {
    let mut shortfalls = Vec::new();

    for (slot, course_indexes) in schedule.by_slot.iter().enumerate() {
        let mut remaining: Vec<u32> = rooms.iter().map(|r| r.capacity).collect();
        let mut room_pointer = 0;

        for &course in course_indexes {
            let strength = schedule.courses[course].strength;
            let mut placed = 0;

            while placed < strength {
                if room_pointer == rooms.len() {
                    warn!(
                        "Could not allot {} for {}: no more rooms remaining for this time slot",
                        schedule.courses[course].code, schedule.slots[slot]
                    );
                    shortfalls.push(Shortfall {
                        course,
                        slot,
                        seats_placed: placed,
                    });
                    break;
                }

                let seats_alloted = min(remaining[room_pointer], strength - placed);
                placed += seats_alloted;
                remaining[room_pointer] -= seats_alloted;
                rooms[room_pointer].allotments.push(Allotment {
                    course,
                    slot,
                    seats_alloted,
                    remarks: Remarks::Full,
                });

                if remaining[room_pointer] == 0 {
                    room_pointer += 1;
                }
            }
        }
    }

    shortfalls
}

/// Seat two courses per room, LEFT and RIGHT halves, using two cursors into the room list.
///
/// Each cursor consumes one half of every room it passes. A course starts on the cursor with
/// the smaller index (LEFT on ties) and keeps taking half-room bites until it is fully seated;
/// when both cursors sit on the last room, the course is reported as a shortfall. After every
/// course the pair of most recently shared rooms is rebalanced, and after every slot a trailing
/// run of single-half allotments is folded back into whole rooms.
pub fn allot_rooms_double(rooms: &mut [Room], schedule: &Schedule) -> Vec<Shortfall> {
    let mut shortfalls = Vec::new();

    if rooms.is_empty() {
        for (slot, course_indexes) in schedule.by_slot.iter().enumerate() {
            for &course in course_indexes {
                warn!(
                    "Could not allot {}: no rooms available",
                    schedule.courses[course].code
                );
                shortfalls.push(Shortfall {
                    course,
                    slot,
                    seats_placed: 0,
                });
            }
        }
        return shortfalls;
    }

    let last = rooms.len() - 1;

    for (slot, course_indexes) in schedule.by_slot.iter().enumerate() {
        // pointer[0] walks LEFT halves, pointer[1] walks RIGHT halves
        let mut pointer: [usize; 2] = [0, 0];

        for &course in course_indexes {
            let strength = schedule.courses[course].strength;
            let mut placed = 0;
            let mut active = smaller_cursor(&pointer);

            while placed < strength {
                if pointer[0] == last && pointer[1] == last {
                    warn!(
                        "Could not allot {} for {}: no more rooms remaining for this time slot",
                        schedule.courses[course].code, schedule.slots[slot]
                    );
                    shortfalls.push(Shortfall {
                        course,
                        slot,
                        seats_placed: placed,
                    });
                    break;
                }
                if pointer[active] == last {
                    active = smaller_cursor(&pointer);
                }

                let room = &mut rooms[pointer[active]];
                let seats_alloted = min(room.half_capacity(), strength - placed);
                placed += seats_alloted;
                room.allotments.push(Allotment {
                    course,
                    slot,
                    seats_alloted,
                    remarks: if active == 0 {
                        Remarks::Left
                    } else {
                        Remarks::Right
                    },
                });
                pointer[active] += 1;
            }

            rebalance_pair(rooms, &mut pointer, slot);
        }

        fold_back_tail(rooms, &mut pointer, slot);
    }

    shortfalls
}

/// The cursor with the smaller index, preferring LEFT on ties
fn smaller_cursor(pointer: &[usize; 2]) -> usize {
    if pointer[0] <= pointer[1] {
        0
    } else {
        1
    }
}

/// Rebalance the last room shared by the current course and its partner course in the slot.
///
/// Looks at the last two allotments of the `former` room (the second to last room touched by the
/// cursor pair). If the larger of the two can be grown from the most recent allotment of the
/// `later` room, and that allotment belongs to the same course, seats are pulled backwards:
/// either `free` seats move, or the whole tail allotment is absorbed and the lagging cursor
/// steps back. This suppresses the degenerate case of a tiny fragment stranded in room K while
/// a near-full half in room K-1 could have taken it.
fn rebalance_pair(rooms: &mut [Room], pointer: &mut [usize; 2], slot: usize) {
    let smaller = smaller_cursor(pointer);
    let (former, later) = if pointer[0] == pointer[1] {
        (pointer[0].checked_sub(2), pointer[1].checked_sub(1))
    } else {
        (
            pointer[smaller].checked_sub(1),
            pointer[1 - smaller].checked_sub(1),
        )
    };
    let (former, later) = match (former, later) {
        (Some(f), Some(l)) if f != l => (f, l),
        _ => return,
    };

    // Both courses must have reached the former room, and the last room is left alone because
    // there is nothing behind it to pull from.
    if rooms[former].allotments.len() < 2 || pointer[smaller] == rooms.len() - 1 {
        return;
    }

    let a1 = &rooms[former].allotments[rooms[former].allotments.len() - 2];
    let a2 = &rooms[former].allotments[rooms[former].allotments.len() - 1];
    if a1.slot != slot || a2.slot != slot {
        return;
    }

    let free = rooms[former].capacity - a1.seats_alloted - a2.seats_alloted;
    // Grow the larger of the two allotments; equal halves leave nothing to tighten
    let grow_offset = if a1.seats_alloted < a2.seats_alloted {
        1
    } else if a2.seats_alloted < a1.seats_alloted {
        2
    } else {
        return;
    };
    let grow_pos = rooms[former].allotments.len() - grow_offset;
    let grow_course = rooms[former].allotments[grow_pos].course;

    let (tail_seats, tail_course) = match rooms[later].allotments.last() {
        Some(tail) => (tail.seats_alloted, tail.course),
        None => return,
    };
    if tail_course != grow_course {
        return;
    }

    if tail_seats > free {
        rooms[former].allotments[grow_pos].seats_alloted += free;
        if let Some(tail) = rooms[later].allotments.last_mut() {
            tail.seats_alloted -= free;
        }
        debug!(
            "Rebalanced {} seats of course {} from room {} back into room {}",
            free, grow_course, rooms[later].number, rooms[former].number
        );
    } else {
        rooms[former].allotments[grow_pos].seats_alloted += tail_seats;
        rooms[later].allotments.pop();
        pointer[1 - smaller] -= 1;
        debug!(
            "Absorbed the {}-seat tail of course {} from room {} into room {}",
            tail_seats, grow_course, rooms[later].number, rooms[former].number
        );
    }
}

/// Fold a trailing run of single-half allotments back into whole rooms.
///
/// When the cursors end a slot at different positions, the rooms between them hold one
/// half-allotment each, all for the same course. Those fragments are popped, summed, and
/// re-placed behind the lagging cursor as FULL allotments.
fn fold_back_tail(rooms: &mut [Room], pointer: &mut [usize; 2], slot: usize) {
    if pointer[0] == pointer[1] {
        return;
    }
    let ahead = if pointer[0] > pointer[1] { 0 } else { 1 };
    let behind = ahead ^ 1;

    let course = match rooms[pointer[ahead] - 1].allotments.last() {
        Some(a) => a.course,
        None => return,
    };

    let mut total = 0;
    for i in pointer[behind]..pointer[ahead] {
        if let Some(a) = rooms[i].allotments.pop() {
            debug_assert!(a.slot == slot, "trailing allotment from a different slot");
            total += a.seats_alloted;
        }
    }

    let mut placed = 0;
    while placed < total {
        let room = &mut rooms[pointer[behind]];
        let seats_alloted = min(room.capacity, total - placed);
        placed += seats_alloted;
        room.allotments.push(Allotment {
            course,
            slot,
            seats_alloted,
            remarks: Remarks::Full,
        });
        pointer[behind] += 1;
    }
}

/// Collapse duplicate entries for the same course within each room.
///
/// When the double-mode packer happens to put both halves of one room to the same course, the
/// exported plan should show one row ("course X occupies 40 seats in room R") instead of two.
/// Allotments are partitioned by course, each group is folded into its first entry (summing the
/// seats and setting FULL remarks), and the list is rewritten; the relative order of first
/// occurrences is kept. Running the pass twice yields the same result.
pub fn post_process(rooms: &mut [Room]) {
    for room in rooms {
        let old = std::mem::take(&mut room.allotments);
        let mut merged: Vec<Allotment> = Vec::with_capacity(old.len());
        for allotment in old {
            match merged.iter_mut().find(|m| m.course == allotment.course) {
                Some(first) => {
                    first.seats_alloted += allotment.seats_alloted;
                    first.remarks = Remarks::Full;
                }
                None => merged.push(allotment),
            }
        }
        room.allotments = merged;
    }
}
