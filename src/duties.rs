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

//! The staff duty allotment engines: assigning room captains and group captains to the rows of
//! the invigilation schedule.
//!
//! Both assigners are per-row greedy scans over the captain list in its input order, under the
//! same hard constraints: a captain on leave for the row's date is skipped, nobody serves more
//! than [`MAX_DUTIES`] duties over the planning horizon, nobody serves two different periods on
//! the same date, and per (date, branch) no more than half of a branch's captains are drawn.
//! Room captains are assigned row by row over the whole schedule; group captains are assigned
//! floor by floor. Rows for which no captain satisfies the constraints are left empty (a
//! partial roster is valid output) and reported to the operator via the log.

use crate::{DutyRow, StaffMember};
use chrono::NaiveDate;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

/// Maximum number of duties one captain serves across the planning horizon
pub const MAX_DUTIES: usize = 10;

/// Per-run assignment state for one captain pool.
///
/// Branch totals are computed once per run; the duty lists and branch counters grow as rows are
/// assigned.
struct DutyLedger {
    /// For each captain (by position in the pool), the (date, period) duties served so far
    duties: Vec<Vec<(NaiveDate, Option<crate::Period>)>>,
    /// Number of captains already drawn from a branch on a date
    branch_duty_count: HashMap<(NaiveDate, String), usize>,
    /// Number of captains per branch in the pool
    branch_totals: HashMap<String, usize>,
}

impl DutyLedger {
    fn new(captains: &[StaffMember]) -> DutyLedger {
        let mut branch_totals = HashMap::new();
        for captain in captains {
            *branch_totals.entry(captain.branch.clone()).or_insert(0) += 1;
        }
        DutyLedger {
            duties: vec![Vec::new(); captains.len()],
            branch_duty_count: HashMap::new(),
            branch_totals,
        }
    }

    /// Check all hard constraints for assigning the captain at `pos` to `row`
    fn is_eligible(&self, pos: usize, captain: &StaffMember, row: &DutyRow) -> bool {
        // Single-day leave blackout: only the literal end date is blocked
        if captain.end_date == Some(row.date) {
            return false;
        }
        let branch_total = self.branch_totals.get(&captain.branch).copied().unwrap_or(0);
        let branch_used = self
            .branch_duty_count
            .get(&(row.date, captain.branch.clone()))
            .copied()
            .unwrap_or(0);
        if branch_used >= branch_total / 2 {
            return false;
        }
        if self.duties[pos].len() >= MAX_DUTIES {
            return false;
        }
        // A single-day two-period duty is forbidden
        if self.duties[pos]
            .iter()
            .any(|&(date, period)| date == row.date && period != row.period)
        {
            return false;
        }
        true
    }

    fn record(&mut self, pos: usize, captain: &StaffMember, row: &DutyRow) {
        self.duties[pos].push((row.date, row.period));
        *self
            .branch_duty_count
            .entry((row.date, captain.branch.clone()))
            .or_insert(0) += 1;
    }
}

/// Bring the invigilation schedule into assignment order: duplicate rows are dropped and the
/// remainder is sorted by (room, date, period), stable within equal keys.
pub fn normalize_schedule(rows: &mut Vec<DutyRow>) {
    let mut seen = HashSet::new();
    rows.retain(|row| {
        seen.insert((
            row.room.clone(),
            row.date,
            row.start_time.clone(),
            row.end_time.clone(),
        ))
    });
    rows.sort_by(|a, b| {
        (a.room.as_str(), a.date, a.period).cmp(&(b.room.as_str(), b.date, b.period))
    });
}

/// Assign room captains to every schedule row.
///
/// Captains are scanned in their input order and the first eligible one is assigned. Rooms
/// named in `double_staffed` demand two invigilators: for those, the scan continues until two
/// captains are found. Rows with no eligible captain keep an empty list.
pub fn assign_room_captains(
    rows: &mut [DutyRow],
    captains: &[StaffMember],
    double_staffed: &[String],
) {
    let mut ledger = DutyLedger::new(captains);

    for row in rows.iter_mut() {
        let mut assigned = Vec::new();
        for (pos, captain) in captains.iter().enumerate() {
            if !ledger.is_eligible(pos, captain, row) {
                continue;
            }
            ledger.record(pos, captain, row);
            assigned.push(format!("{} - {}", captain.id, captain.name));
            if double_staffed.contains(&row.room) && assigned.len() < 2 {
                continue;
            }
            break;
        }
        if assigned.is_empty() {
            warn!(
                "No room captain available for room {} on {} ({})",
                row.room,
                row.date.format("%d-%m-%Y"),
                row.start_time
            );
        }
        row.room_captains = assigned;
    }
}

/// Assign one group captain to every schedule row, working floor by floor.
///
/// Floors are processed in order of first appearance in the schedule; within a floor, rows keep
/// their current order. The constraint set is the same as for room captains; the first eligible
/// captain wins and the scan stops.
pub fn assign_group_captains(rows: &mut [DutyRow], captains: &[StaffMember]) {
    let mut ledger = DutyLedger::new(captains);

    let mut floors = Vec::new();
    for row in rows.iter() {
        if !floors.contains(&row.floor) {
            floors.push(row.floor);
        }
    }

    for floor in floors {
        for row in rows.iter_mut().filter(|r| r.floor == floor) {
            let mut assigned = None;
            for (pos, captain) in captains.iter().enumerate() {
                if !ledger.is_eligible(pos, captain, row) {
                    continue;
                }
                ledger.record(pos, captain, row);
                assigned = Some(format!("{} - {}", captain.id, captain.name));
                break;
            }
            if assigned.is_none() {
                warn!(
                    "No group captain available for room {} on {} ({})",
                    row.room,
                    row.date.format("%d-%m-%Y"),
                    row.start_time
                );
            } else {
                debug!("Group captain for {} on {}: {:?}", row.room, row.date, assigned);
            }
            row.group_captain = assigned;
        }
    }
}
