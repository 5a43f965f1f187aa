
pub mod duties;
pub mod io;
pub mod seating;

use chrono::NaiveDate;
use std::fmt;

/// A single examination sitting, identified by its date and start/end time.
///
/// The three components are kept verbatim as they appeared in the input, so the exported seating
/// plan reproduces them bit-identically. Equality is structural; the canonical string form joins
/// the components with `|` (e.g. `29-08-2019|15:00|18:00`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimeSlot {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.date, self.start_time, self.end_time)
    }
}

/// Representation of an examination room's data
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Room {
    /// Room number/name as given in the rooms file. Used as the room's id in all outputs.
    pub number: String,
    /// Total number of seats in the room
    pub capacity: u32,
    /// Allotments made into this room, in packing order. The order is load-bearing: the
    /// double-mode rebalance inspects the last two entries.
    pub allotments: Vec<Allotment>,
}

impl Room {
    pub fn new(number: String, capacity: u32) -> Room {
        Room {
            number,
            capacity,
            allotments: Vec::new(),
        }
    }

    /// Number of seats in one half of the room, for two-courses-per-room seating
    pub fn half_capacity(&self) -> u32 {
        self.capacity / 2
    }
}

/// Representation of an examination course's data (one row of the exam schedule)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Course {
    /// id/index of the Course in the schedule's list of courses
    pub index: usize,
    /// Course code, e.g. `CS F111`
    pub code: String,
    /// Course name. Mainly used for info/debug output and the exported plan
    pub name: String,
    /// Number of students enrolled for the examination
    pub strength: u32,
    /// Index of the course's time slot in the schedule's list of slots
    pub slot: usize,
}

/// Which part of a room an allotment occupies
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Remarks {
    /// The allotment occupies the whole room for its slot
    Full,
    /// The allotment occupies the left half in two-courses-per-room mode
    Left,
    /// The allotment occupies the right half in two-courses-per-room mode
    Right,
}

impl fmt::Display for Remarks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Remarks::Full => "FULL",
            Remarks::Left => "LEFT",
            Remarks::Right => "RIGHT",
        })
    }
}

/// A number of seats in one room, given to one course for one time slot.
///
/// Courses and slots are referenced by their indexes in the `Schedule` they were read from,
/// which makes the "same course" checks of the packers cheap structural comparisons.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allotment {
    /// Index of the course in the schedule's course list
    pub course: usize,
    /// Index of the time slot in the schedule's slot list
    pub slot: usize,
    /// Number of seats given to the course in this room
    pub seats_alloted: u32,
    pub remarks: Remarks,
}

/// The parsed examination schedule: all time slots (in order of first appearance in the input),
/// all courses, and for each slot the indexes of its courses, sorted by descending strength
/// (stable on ties, so equal-strength courses keep their input order).
#[derive(Debug, Default)]
pub struct Schedule {
    pub slots: Vec<TimeSlot>,
    pub courses: Vec<Course>,
    pub by_slot: Vec<Vec<usize>>,
}

impl Schedule {
    /// Index of the given time slot, if it is part of this schedule
    pub fn slot_index(&self, slot: &TimeSlot) -> Option<usize> {
        self.slots.iter().position(|s| s == slot)
    }
}

/// Supervision role of a staff member
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Invigilates a single room for one (date, period)
    RoomCaptain,
    /// Supervises a floor for one (date, period)
    GroupCaptain,
}

impl Role {
    /// Parse the role column of the STAFF sheet. Unknown values yield None; the reader skips
    /// those rows.
    pub fn parse(value: &str) -> Option<Role> {
        match value.trim() {
            "ROOM CAPTAIN" => Some(Role::RoomCaptain),
            "GROUP CAPTAIN" => Some(Role::GroupCaptain),
            _ => None,
        }
    }
}

/// Representation of a supervising staff member's data
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaffMember {
    pub id: String,
    pub name: String,
    /// Academic department. Used only for the per-day fairness cap.
    pub branch: String,
    pub role: Role,
    pub phone: String,
    pub email: String,
    /// Leave end date from the leave workbook. A captain with `end_date == d` is unavailable on
    /// date `d` and only on that day.
    pub end_date: Option<NaiveDate>,
}

/// One row of the leave workbook
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Leave {
    pub staff_id: String,
    pub name: String,
    /// None when the cell did not parse as a date (such rows have no effect)
    pub end_date: Option<NaiveDate>,
}

/// Period label of an invigilation sitting.
///
/// The labels are derived from the start time with `09:30 -> AN` and `14:00 -> FN`, which
/// inverts the conventional readings of the abbreviations. The mapping is kept as the
/// operators use it; see the Period derivation in `io::staff`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Period {
    An,
    Fn,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Period::An => "AN",
            Period::Fn => "FN",
        })
    }
}

/// Floor of a room, derived from the room name
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Floor {
    Ground,
    First,
    /// Room names that do not carry a floor digit
    Reserved,
}

impl fmt::Display for Floor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Floor::Ground => "Ground Floor",
            Floor::First => "First Floor",
            Floor::Reserved => "Reserved",
        })
    }
}

/// One row of the invigilation schedule: a (room, date, period) sitting and the captains
/// assigned to it. The captain fields are filled in place by the assigners in `duties`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DutyRow {
    pub room: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    /// None for start times that are neither `09:30` nor `14:00`
    pub period: Option<Period>,
    pub floor: Floor,
    /// Assigned room captains as `"{id} - {name}"`. Usually one entry; two for rooms in the
    /// double-staffed list.
    pub room_captains: Vec<String>,
    /// Assigned group captain as `"{id} - {name}"`, or None if no captain satisfied the
    /// constraints
    pub group_captain: Option<String>,
}
