//! IO functionality for exporting the calculated seating plan as a CSV file.

use crate::{Room, Schedule};

const HEADER: [&str; 8] = [
    "Room",
    "Course Code",
    "Course Name",
    "Room Capacity",
    "Student Count",
    "Course Strength",
    "Time",
    "Remarks",
];

/// Write the seating plan to a Writer (e.g. an output file): one row per (room, allotment), in
/// room order, with the time slot pipe-joined as `date|start|end`.
pub fn write<W: std::io::Write>(
    writer: W,
    rooms: &[Room],
    schedule: &Schedule,
) -> Result<(), String> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(&HEADER)
        .map_err(|e| e.to_string())?;

    for room in rooms {
        for allotment in room.allotments.iter() {
            let course = &schedule.courses[allotment.course];
            csv_writer
                .write_record(&[
                    room.number.clone(),
                    course.code.clone(),
                    course.name.clone(),
                    room.capacity.to_string(),
                    allotment.seats_alloted.to_string(),
                    course.strength.to_string(),
                    schedule.slots[allotment.slot].to_string(),
                    allotment.remarks.to_string(),
                ])
                .map_err(|e| e.to_string())?;
        }
    }

    csv_writer.flush().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::write;
    use crate::{Allotment, Course, Remarks, Room, Schedule, TimeSlot};

    #[test]
    fn test_write() {
        let schedule = Schedule {
            slots: vec![TimeSlot {
                date: String::from("29-08-2019"),
                start_time: String::from("15:00"),
                end_time: String::from("18:00"),
            }],
            courses: vec![Course {
                index: 0,
                code: String::from("CS F111"),
                name: String::from("Data Structures"),
                strength: 80,
                slot: 0,
            }],
            by_slot: vec![vec![0]],
        };
        let mut rooms = vec![Room::new(String::from("F101"), 60), Room::new(String::from("F102"), 40)];
        rooms[0].allotments.push(Allotment {
            course: 0,
            slot: 0,
            seats_alloted: 60,
            remarks: Remarks::Full,
        });
        rooms[1].allotments.push(Allotment {
            course: 0,
            slot: 0,
            seats_alloted: 20,
            remarks: Remarks::Full,
        });

        let mut out = Vec::new();
        write(&mut out, &rooms, &schedule).unwrap();

        let expected = "\
Room,Course Code,Course Name,Room Capacity,Student Count,Course Strength,Time,Remarks
F101,CS F111,Data Structures,60,60,80,29-08-2019|15:00|18:00,FULL
F102,CS F111,Data Structures,40,20,80,29-08-2019|15:00|18:00,FULL
";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }
}
