//! IO functionality for reading the list of examination rooms from a CSV file.

use crate::Room;
use log::warn;
use serde::Deserialize;

/// One line of the rooms file: `room_number,capacity`, no header row
#[derive(Deserialize, Debug)]
struct RoomRecord {
    number: String,
    capacity: u32,
}

/// Read the examination rooms from a headerless CSV file with one `room_number,capacity` line
/// per room (e.g. `F101,60`).
///
/// The rooms are returned in file order; the packers use the list as given, so the file order
/// is the packing order unless the caller re-sorts (see `sort_largest_first`). Duplicate room
/// numbers are kept but reported, since they usually indicate a slip in the source sheet.
pub fn read<R: std::io::Read>(reader: R) -> Result<Vec<Room>, String> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rooms: Vec<Room> = Vec::new();
    for (i, record) in csv_reader.deserialize().enumerate() {
        let record: RoomRecord = record.map_err(|e| {
            format!(
                "Malformed room in line {}: {} (expected `room_number,capacity`, e.g. `F101,60`)",
                i + 1,
                e
            )
        })?;
        // Spreadsheet exports occasionally start with a byte order mark
        let number = record.number.trim_start_matches('\u{feff}').to_owned();
        if rooms.iter().any(|r| r.number == number) {
            warn!("Duplicate room number {} in rooms file", number);
        }
        rooms.push(Room::new(number, record.capacity));
    }

    Ok(rooms)
}

/// Sort rooms by descending capacity, keeping the input order between equal capacities.
///
/// The packing engines never reorder the room list; callers that want largest-first packing
/// apply this before handing the rooms over.
pub fn sort_largest_first(rooms: &mut [Room]) {
    rooms.sort_by_key(|r| std::cmp::Reverse(r.capacity));
}

#[cfg(test)]
mod tests {
    use super::{read, sort_largest_first};

    #[test]
    fn test_read() {
        let data = b"F101,60\nF102,40\nF103, 75\n";
        let rooms = read(&data[..]).unwrap();

        assert_eq!(rooms.len(), 3);
        assert_eq!(rooms[0].number, "F101");
        assert_eq!(rooms[0].capacity, 60);
        assert_eq!(rooms[2].number, "F103");
        assert_eq!(rooms[2].capacity, 75);
        assert!(rooms.iter().all(|r| r.allotments.is_empty()));
    }

    #[test]
    fn test_read_strips_byte_order_mark() {
        let data = "\u{feff}F101,60\n".as_bytes();
        let rooms = read(data).unwrap();
        assert_eq!(rooms[0].number, "F101");
    }

    #[test]
    fn test_read_rejects_bad_capacity() {
        let data = b"F101,sixty\n";
        let err = read(&data[..]).unwrap_err();
        assert!(err.contains("line 1"), "unexpected message: {}", err);
    }

    #[test]
    fn test_sort_largest_first_is_stable() {
        let data = b"A,40\nB,60\nC,60\nD,50\n";
        let mut rooms = read(&data[..]).unwrap();
        sort_largest_first(&mut rooms);

        let order: Vec<&str> = rooms.iter().map(|r| r.number.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "D", "A"]);
    }
}
