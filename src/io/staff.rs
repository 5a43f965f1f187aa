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

//! IO functionality for the staff duty workbooks: reading the invigilation schedule (`ROOM`
//! sheet) and the staff pool (`STAFF` sheet) from one workbook, reading the leave workbook, and
//! writing the finished duty roster to the `FINAL` sheet of the output workbook.

use crate::{DutyRow, Floor, Leave, Period, Role, StaffMember};
use chrono::NaiveDate;
use log::debug;
use std::path::Path;
use umya_spreadsheet::Worksheet;

/// Date format used inside the duty and leave workbooks
const SHEET_DATE_FORMAT: &str = "%d-%m-%y";
/// Date format used in the exported roster
const OUTPUT_DATE_FORMAT: &str = "%d-%m-%Y";

/// Derive the period label from a sitting's start time.
///
/// The `09:30 -> AN` / `14:00 -> FN` mapping is the one the operators use in their sheets, even
/// though it inverts the conventional readings of the abbreviations; any other start time gets
/// no label.
pub fn period_of(start_time: &str) -> Option<Period> {
    match start_time {
        "09:30" => Some(Period::An),
        "14:00" => Some(Period::Fn),
        _ => None,
    }
}

/// Derive the floor from a room name: if the last three characters are digits, the
/// third-from-last is the floor digit (`1` is the ground floor, everything else the first
/// floor); all other names are reserved rooms.
pub fn floor_of(room: &str) -> Floor {
    let bytes = room.as_bytes();
    if bytes.len() >= 3 && bytes[bytes.len() - 3..].iter().all(u8::is_ascii_digit) {
        if bytes[bytes.len() - 3] == b'1' {
            Floor::Ground
        } else {
            Floor::First
        }
    } else {
        Floor::Reserved
    }
}

/// Read the invigilation schedule and the staff pool from the duty workbook.
///
/// The workbook must contain a `ROOM` sheet (header row with at least the columns `Room` and
/// `Time`, the latter pipe-joined as `date|start|end` with a DD-MM-YY date) and a `STAFF` sheet
/// (no header; serial, id, name, branch, role, phone, email). Staff rows with a role other than
/// `ROOM CAPTAIN` or `GROUP CAPTAIN` are skipped.
///
/// # Errors
///
/// Fails with a string error message to be displayed to the user, if the workbook cannot be
/// opened, a required sheet or column is missing, or a `Time` cell does not parse.
pub fn read_duty_workbook(path: &Path) -> Result<(Vec<DutyRow>, Vec<StaffMember>), String> {
    let book = umya_spreadsheet::reader::xlsx::read(path)
        .map_err(|e| format!("Could not read workbook {}: {}", path.display(), e))?;

    let room_sheet = book
        .get_sheet_by_name("ROOM")
        .ok_or("Sheet 'ROOM' not found in the duty workbook")?;
    let rows = parse_room_sheet(room_sheet)?;

    let staff_sheet = book
        .get_sheet_by_name("STAFF")
        .ok_or("Sheet 'STAFF' not found in the duty workbook")?;
    let staff = parse_staff_sheet(staff_sheet);

    Ok((rows, staff))
}

fn parse_room_sheet(sheet: &Worksheet) -> Result<Vec<DutyRow>, String> {
    let mut room_col = None;
    let mut time_col = None;
    for col in 1..=sheet.get_highest_column() {
        let header = sheet.get_value((col, 1));
        match header.trim() {
            "Room" => room_col = Some(col),
            "Time" => time_col = Some(col),
            _ => {}
        }
    }
    let room_col = room_col.ok_or("Column 'Room' not found in the ROOM sheet")?;
    let time_col = time_col.ok_or("Column 'Time' not found in the ROOM sheet")?;

    let mut rows = Vec::new();
    for row in 2..=sheet.get_highest_row() {
        let room = sheet.get_value((room_col, row)).trim().to_owned();
        let time = sheet.get_value((time_col, row)).trim().to_owned();
        if room.is_empty() && time.is_empty() {
            continue;
        }

        let parts: Vec<&str> = time.split('|').collect();
        if parts.len() != 3 {
            return Err(format!(
                "Invalid Time value '{}' for room {}: expected `date|start|end`, e.g. \
                 01-03-25|09:30|12:30",
                time, room
            ));
        }
        let date = NaiveDate::parse_from_str(parts[0], SHEET_DATE_FORMAT).map_err(|_| {
            format!(
                "Invalid date '{}' for room {}: ensure the format is DD-MM-YY",
                parts[0], room
            )
        })?;

        let floor = floor_of(&room);
        rows.push(DutyRow {
            room,
            date,
            start_time: parts[1].to_owned(),
            end_time: parts[2].to_owned(),
            period: period_of(parts[1]),
            floor,
            room_captains: Vec::new(),
            group_captain: None,
        });
    }

    Ok(rows)
}

fn parse_staff_sheet(sheet: &Worksheet) -> Vec<StaffMember> {
    let mut staff = Vec::new();
    for row in 1..=sheet.get_highest_row() {
        let id = sheet.get_value((2, row)).trim().to_owned();
        let name = sheet.get_value((3, row)).trim().to_owned();
        if id.is_empty() && name.is_empty() {
            continue;
        }

        let role_value = sheet.get_value((5, row));
        let role = match Role::parse(&role_value) {
            Some(role) => role,
            None => {
                debug!("Skipping staff member {} with role '{}'", id, role_value.trim());
                continue;
            }
        };

        staff.push(StaffMember {
            id,
            name,
            branch: sheet.get_value((4, row)).trim().to_owned(),
            role,
            phone: sheet.get_value((6, row)).trim().to_owned(),
            email: sheet.get_value((7, row)).trim().to_owned(),
            end_date: None,
        });
    }
    staff
}

/// Read the leave workbook: the first sheet, with a header row containing at least `ID`,
/// `Name` and `end_date` columns. Cells that do not parse as DD-MM-YY dates are kept with an
/// absent end date, so such rows have no effect on availability.
pub fn read_leave_workbook(path: &Path) -> Result<Vec<Leave>, String> {
    let book = umya_spreadsheet::reader::xlsx::read(path)
        .map_err(|e| format!("Could not read workbook {}: {}", path.display(), e))?;
    let sheet = book
        .get_sheet_collection()
        .first()
        .ok_or("Leave workbook contains no sheets")?;

    let mut id_col = None;
    let mut name_col = None;
    let mut end_date_col = None;
    for col in 1..=sheet.get_highest_column() {
        let header = sheet.get_value((col, 1));
        match header.trim() {
            "ID" => id_col = Some(col),
            "Name" => name_col = Some(col),
            "end_date" => end_date_col = Some(col),
            _ => {}
        }
    }
    let id_col = id_col.ok_or("Column 'ID' not found in the leave workbook")?;
    let name_col = name_col.ok_or("Column 'Name' not found in the leave workbook")?;
    let end_date_col = end_date_col.ok_or("Column 'end_date' not found in the leave workbook")?;

    let mut leave = Vec::new();
    for row in 2..=sheet.get_highest_row() {
        let staff_id = sheet.get_value((id_col, row)).trim().to_owned();
        let name = sheet.get_value((name_col, row)).trim().to_owned();
        if staff_id.is_empty() && name.is_empty() {
            continue;
        }
        let end_date =
            NaiveDate::parse_from_str(sheet.get_value((end_date_col, row)).trim(), SHEET_DATE_FORMAT)
                .ok();
        leave.push(Leave {
            staff_id,
            name,
            end_date,
        });
    }

    Ok(leave)
}

/// Attach leave end dates to the staff pool, joining on (id, name). Staff without a leave
/// entry keep an absent end date.
pub fn apply_leave(staff: &mut [StaffMember], leave: &[Leave]) {
    for member in staff.iter_mut() {
        if let Some(entry) = leave
            .iter()
            .find(|l| l.staff_id == member.id && l.name == member.name)
        {
            member.end_date = entry.end_date;
        }
    }
}

/// Write the finished duty roster to the `FINAL` sheet of a new workbook at `path`. Dates are
/// re-formatted to DD-MM-YYYY; multiple room captains are comma-joined.
pub fn write_final(path: &Path, rows: &[DutyRow]) -> Result<(), String> {
    const HEADER: [&str; 8] = [
        "Room",
        "Date",
        "Start Time",
        "End Time",
        "Period",
        "Floor",
        "Room Captain",
        "Group Captain",
    ];

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("FINAL").map_err(|e| e.to_string())?;

    for (col, title) in HEADER.iter().enumerate() {
        sheet
            .write_string(0, col as u16, *title)
            .map_err(|e| e.to_string())?;
    }
    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        let cells = [
            row.room.clone(),
            row.date.format(OUTPUT_DATE_FORMAT).to_string(),
            row.start_time.clone(),
            row.end_time.clone(),
            row.period.map(|p| p.to_string()).unwrap_or_default(),
            row.floor.to_string(),
            row.room_captains.join(", "),
            row.group_captain.clone().unwrap_or_default(),
        ];
        for (col, value) in cells.iter().enumerate() {
            sheet
                .write_string(r, col as u16, value.as_str())
                .map_err(|e| e.to_string())?;
        }
    }

    workbook
        .save(path)
        .map_err(|e| format!("Could not write workbook {}: {}", path.display(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        apply_leave, floor_of, period_of, read_duty_workbook, read_leave_workbook, write_final,
    };
    use crate::{DutyRow, Floor, Period, Role};
    use chrono::NaiveDate;

    #[test]
    fn test_period_of() {
        assert_eq!(period_of("09:30"), Some(Period::An));
        assert_eq!(period_of("14:00"), Some(Period::Fn));
        assert_eq!(period_of("10:00"), None);
    }

    #[test]
    fn test_floor_of() {
        assert_eq!(floor_of("F101"), Floor::Ground);
        assert_eq!(floor_of("F102"), Floor::Ground);
        assert_eq!(floor_of("F201"), Floor::First);
        assert_eq!(floor_of("AUDI"), Floor::Reserved);
        assert_eq!(floor_of("12"), Floor::Reserved);
    }

    /// Build a duty workbook with rust_xlsxwriter and read it back: the same library pairing
    /// the real data takes, so the whole ingestion path is exercised.
    #[test]
    fn test_duty_workbook_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let duty_path = dir.path().join("duties.xlsx");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let room_sheet = workbook.add_worksheet();
        room_sheet.set_name("ROOM").unwrap();
        room_sheet.write_string(0, 0, "Room").unwrap();
        room_sheet.write_string(0, 1, "Time").unwrap();
        for (i, (room, time)) in [
            ("F101", "01-03-25|09:30|12:30"),
            ("F201", "01-03-25|14:00|17:00"),
            ("AUDI", "02-03-25|10:00|13:00"),
        ]
        .iter()
        .enumerate()
        {
            room_sheet.write_string(i as u32 + 1, 0, *room).unwrap();
            room_sheet.write_string(i as u32 + 1, 1, *time).unwrap();
        }
        let staff_sheet = workbook.add_worksheet();
        staff_sheet.set_name("STAFF").unwrap();
        for (i, member) in [
            ["1", "P1", "Alice", "CS", "ROOM CAPTAIN", "111", "alice@example.edu"],
            ["2", "G1", "Bob", "EE", "GROUP CAPTAIN", "222", "bob@example.edu"],
            ["3", "X1", "Carol", "ME", "CLERK", "333", "carol@example.edu"],
        ]
        .iter()
        .enumerate()
        {
            for (col, value) in member.iter().enumerate() {
                staff_sheet
                    .write_string(i as u32, col as u16, *value)
                    .unwrap();
            }
        }
        workbook.save(&duty_path).unwrap();

        let (rows, staff) = read_duty_workbook(&duty_path).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].room, "F101");
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(rows[0].start_time, "09:30");
        assert_eq!(rows[0].period, Some(Period::An));
        assert_eq!(rows[0].floor, Floor::Ground);
        assert_eq!(rows[1].period, Some(Period::Fn));
        assert_eq!(rows[1].floor, Floor::First);
        assert_eq!(rows[2].period, None);
        assert_eq!(rows[2].floor, Floor::Reserved);

        // The clerk is not part of the captain pool
        assert_eq!(staff.len(), 2);
        assert_eq!(staff[0].id, "P1");
        assert_eq!(staff[0].role, Role::RoomCaptain);
        assert_eq!(staff[1].role, Role::GroupCaptain);
    }

    #[test]
    fn test_leave_round_trip_and_join() {
        let dir = tempfile::tempdir().unwrap();
        let duty_path = dir.path().join("duties.xlsx");
        let leave_path = dir.path().join("leave.xlsx");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let room_sheet = workbook.add_worksheet();
        room_sheet.set_name("ROOM").unwrap();
        room_sheet.write_string(0, 0, "Room").unwrap();
        room_sheet.write_string(0, 1, "Time").unwrap();
        let staff_sheet = workbook.add_worksheet();
        staff_sheet.set_name("STAFF").unwrap();
        for (col, value) in ["1", "P1", "Alice", "CS", "ROOM CAPTAIN", "111", "a@x"]
            .iter()
            .enumerate()
        {
            staff_sheet.write_string(0, col as u16, *value).unwrap();
        }
        workbook.save(&duty_path).unwrap();

        let mut leave_book = rust_xlsxwriter::Workbook::new();
        let sheet = leave_book.add_worksheet();
        for (col, value) in ["ID", "Name", "end_date"].iter().enumerate() {
            sheet.write_string(0, col as u16, *value).unwrap();
        }
        for (row, values) in [["P1", "Alice", "02-03-25"], ["P9", "Nobody", "soon"]]
            .iter()
            .enumerate()
        {
            for (col, value) in values.iter().enumerate() {
                sheet
                    .write_string(row as u32 + 1, col as u16, *value)
                    .unwrap();
            }
        }
        leave_book.save(&leave_path).unwrap();

        let (_, mut staff) = read_duty_workbook(&duty_path).unwrap();
        let leave = read_leave_workbook(&leave_path).unwrap();

        assert_eq!(leave.len(), 2);
        assert_eq!(
            leave[0].end_date,
            Some(NaiveDate::from_ymd_opt(2025, 3, 2).unwrap())
        );
        // Unparseable dates are coerced to an absent end date
        assert_eq!(leave[1].end_date, None);

        apply_leave(&mut staff, &leave);
        assert_eq!(
            staff[0].end_date,
            Some(NaiveDate::from_ymd_opt(2025, 3, 2).unwrap())
        );
    }

    #[test]
    fn test_write_final() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("roster.xlsx");

        let rows = vec![DutyRow {
            room: String::from("F101"),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            start_time: String::from("09:30"),
            end_time: String::from("12:30"),
            period: Some(Period::An),
            floor: Floor::Ground,
            room_captains: vec![String::from("P1 - Alice"), String::from("P2 - Dave")],
            group_captain: Some(String::from("G1 - Bob")),
        }];
        write_final(&out_path, &rows).unwrap();

        let book = umya_spreadsheet::reader::xlsx::read(&out_path).unwrap();
        let sheet = book.get_sheet_by_name("FINAL").unwrap();
        assert_eq!(sheet.get_value((1, 1)), "Room");
        assert_eq!(sheet.get_value((1, 2)), "F101");
        // Dates are re-formatted to four-digit years on output
        assert_eq!(sheet.get_value((2, 2)), "01-03-2025");
        assert_eq!(sheet.get_value((5, 2)), "AN");
        assert_eq!(sheet.get_value((6, 2)), "Ground Floor");
        assert_eq!(sheet.get_value((7, 2)), "P1 - Alice, P2 - Dave");
        assert_eq!(sheet.get_value((8, 2)), "G1 - Bob");
    }
}
