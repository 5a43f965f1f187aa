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

use std::fs::File;
use std::path::Path;

use examplan::{duties, io, seating, Role, StaffMember};
use log::{debug, error, info, warn};

fn main() {
    // Setup logging & parse command line arguments
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!(
        "This is the Examination Planner (examplan), version {}",
        option_env!("CARGO_PKG_VERSION").unwrap_or("unknown")
    );
    let args = parse_cli_args();

    match args.subcommand() {
        Some(("seating", sub_args)) => run_seating(sub_args),
        Some(("duties", sub_args)) => run_duties(sub_args),
        _ => unreachable!("a subcommand is required"),
    }
}

/// Calculate the seating plan: read rooms and exam schedule, pack, post-process, export.
fn run_seating(args: &clap::ArgMatches) {
    if args.get_one::<String>("OUTPUT").is_none() && !args.get_flag("print") {
        warn!(
            "No OUTPUT file and no --print option given. Seating plan will not be exported \
             anywhere."
        );
    }

    // Read rooms list
    let rooms_path: &String = args.get_one("ROOMS").unwrap();
    debug!("Opening rooms file {} ...", rooms_path);
    let file = File::open(rooms_path).unwrap_or_else(|e| {
        error!("Could not open rooms file {}: {}", rooms_path, e);
        std::process::exit(exitcode::NOINPUT)
    });
    let mut rooms = io::rooms::read(file).unwrap_or_else(|e| {
        error!("Could not read rooms file: {}", e);
        std::process::exit(exitcode::DATAERR)
    });
    if args.get_flag("largest_first") {
        io::rooms::sort_largest_first(&mut rooms);
    }

    // Read exam schedule
    let exams_path: &String = args.get_one("EXAMS").unwrap();
    debug!("Opening exam schedule {} ...", exams_path);
    let file = File::open(exams_path).unwrap_or_else(|e| {
        error!("Could not open exam schedule {}: {}", exams_path, e);
        std::process::exit(exitcode::NOINPUT)
    });
    let schedule = io::exams::read(file).unwrap_or_else(|e| {
        error!("Could not read exam schedule: {}", e);
        std::process::exit(exitcode::DATAERR)
    });

    // In debug build: Check consistency of imported data
    if cfg!(debug_assertions) {
        io::assert_data_consistency(&schedule);
    }

    info!(
        "Found {} rooms and {} courses in {} time slots for room allotment.",
        rooms.len(),
        schedule.courses.len(),
        schedule.slots.len()
    );
    debug!("Courses:\n{}", io::debug_list_of_courses(&schedule));

    if rooms.is_empty() {
        error!("Calculating a seating plan is only possible with 1 or more rooms.");
        std::process::exit(exitcode::DATAERR);
    }

    // Execute the packing engine
    let shortfalls = if args.get_flag("double") {
        seating::allot_rooms_double(&mut rooms, &schedule)
    } else {
        seating::allot_rooms_single(&mut rooms, &schedule)
    };
    if shortfalls.is_empty() {
        info!("All courses are fully seated.");
    } else {
        warn!(
            "{} courses could not be fully seated. The exported plan reflects the partial \
             placement.",
            shortfalls.len()
        );
    }
    seating::post_process(&mut rooms);

    if let Some(outpath) = args.get_one::<String>("OUTPUT") {
        debug!("Opening output file {} ...", outpath);
        let file = File::create(outpath).unwrap_or_else(|e| {
            error!("Could not open output file {}: {}", outpath, e);
            std::process::exit(exitcode::CANTCREAT)
        });
        io::allotment::write(file, &rooms, &schedule).unwrap_or_else(|e| {
            error!("Could not write seating plan to {}: {}", outpath, e);
            std::process::exit(exitcode::IOERR)
        });
        info!("Seating plan written to {}.", outpath);
    }

    if args.get_flag("print") {
        print!(
            "The seating plan is:\n{}",
            io::format_seating_plan(&rooms, &schedule)
        );
    }
}

/// Calculate the duty roster: read the duty and leave workbooks, assign captains, export.
fn run_duties(args: &clap::ArgMatches) {
    if args.get_one::<String>("OUTPUT").is_none() {
        warn!("No OUTPUT file given. Duty roster will not be exported anywhere.");
    }

    // Parse double-staffed rooms list
    let double_staffed: Vec<String> = args
        .get_one::<String>("double_staffed")
        .map(|raw| {
            raw.split(',')
                .map(|r| r.trim().to_owned())
                .filter(|r| !r.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let duties_path: &String = args.get_one("DUTIES").unwrap();
    if !Path::new(duties_path).is_file() {
        error!("Could not open duty workbook {}: no such file", duties_path);
        std::process::exit(exitcode::NOINPUT);
    }
    debug!("Opening duty workbook {} ...", duties_path);
    let (mut rows, mut staff) =
        io::staff::read_duty_workbook(Path::new(duties_path)).unwrap_or_else(|e| {
            error!("Could not read duty workbook: {}", e);
            std::process::exit(exitcode::DATAERR)
        });

    let leave_path: &String = args.get_one("LEAVE").unwrap();
    if !Path::new(leave_path).is_file() {
        error!("Could not open leave workbook {}: no such file", leave_path);
        std::process::exit(exitcode::NOINPUT);
    }
    debug!("Opening leave workbook {} ...", leave_path);
    let leave = io::staff::read_leave_workbook(Path::new(leave_path)).unwrap_or_else(|e| {
        error!("Could not read leave workbook: {}", e);
        std::process::exit(exitcode::DATAERR)
    });
    io::staff::apply_leave(&mut staff, &leave);

    let room_captains: Vec<StaffMember> = staff
        .iter()
        .filter(|s| s.role == Role::RoomCaptain)
        .cloned()
        .collect();
    let group_captains: Vec<StaffMember> = staff
        .iter()
        .filter(|s| s.role == Role::GroupCaptain)
        .cloned()
        .collect();
    info!(
        "Found {} schedule rows, {} room captains and {} group captains for duty allotment.",
        rows.len(),
        room_captains.len(),
        group_captains.len()
    );

    duties::normalize_schedule(&mut rows);
    duties::assign_room_captains(&mut rows, &room_captains, &double_staffed);
    duties::assign_group_captains(&mut rows, &group_captains);

    let unfilled = rows
        .iter()
        .filter(|r| r.room_captains.is_empty() || r.group_captain.is_none())
        .count();
    if unfilled == 0 {
        info!("All schedule rows are fully staffed.");
    } else {
        warn!(
            "{} schedule rows are missing a captain. The exported roster leaves those fields \
             empty.",
            unfilled
        );
    }

    if let Some(outpath) = args.get_one::<String>("OUTPUT") {
        debug!("Opening output workbook {} ...", outpath);
        io::staff::write_final(Path::new(outpath), &rows).unwrap_or_else(|e| {
            error!("Could not write duty roster to {}: {}", outpath, e);
            std::process::exit(exitcode::CANTCREAT)
        });
        info!("Duty roster written to {}.", outpath);
    }
}

/// Helper function to construct and execute parser for command line options
fn parse_cli_args() -> clap::ArgMatches {
    clap::command!()
        .subcommand_required(true)
        .subcommand(
            clap::Command::new("seating")
                .about("Calculate the room allotment for an examination schedule")
                .arg(
                    clap::Arg::new("double")
                        .short('d')
                        .long("double")
                        .help(
                            "Seat two courses per room, one in the left and one in the right \
                             half. Otherwise every room holds a single course at a time.",
                        )
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    clap::Arg::new("largest_first")
                        .short('l')
                        .long("largest-first")
                        .help(
                            "Sort rooms by descending capacity before packing. Otherwise rooms \
                             are packed in the order of the rooms file.",
                        )
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    clap::Arg::new("print")
                        .short('p')
                        .long("print")
                        .help(
                            "Print the calculated seating plan to stdout in a human readable \
                             format",
                        )
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    clap::Arg::new("ROOMS")
                        .help(
                            "CSV file with one `room_number,capacity` line per room and no \
                             header row",
                        )
                        .required(true)
                        .index(1),
                )
                .arg(
                    clap::Arg::new("EXAMS")
                        .help(
                            "CSV file with one \
                             `course_code,course_name,strength,date,start_time,end_time` line \
                             per course and no header row",
                        )
                        .required(true)
                        .index(2),
                )
                .arg(
                    clap::Arg::new("OUTPUT")
                        .help("Sets the output CSV file to use")
                        .index(3),
                ),
        )
        .subcommand(
            clap::Command::new("duties")
                .about("Assign room captains and group captains to the invigilation schedule")
                .arg(
                    clap::Arg::new("double_staffed")
                        .long("double-staffed")
                        .value_name("ROOMS")
                        .default_value("F102,F105")
                        .help(
                            "Comma-separated list of rooms that demand two room captains, e.g. \
                             F102,F105",
                        ),
                )
                .arg(
                    clap::Arg::new("DUTIES")
                        .help("Workbook with the invigilation schedule (sheet ROOM) and the \
                               staff pool (sheet STAFF)")
                        .required(true)
                        .index(1),
                )
                .arg(
                    clap::Arg::new("LEAVE")
                        .help("Workbook with staff leave (columns ID, Name, end_date)")
                        .required(true)
                        .index(2),
                )
                .arg(
                    clap::Arg::new("OUTPUT")
                        .help("Sets the output workbook to use")
                        .index(3),
                ),
        )
        .get_matches()
}
