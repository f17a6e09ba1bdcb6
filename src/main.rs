//! Command-line interface for the shift planner.
//!
//! Interactive menu for replicating monthly shifts, managing single
//! shifts, and reviewing shift trades against an in-memory store.

use chrono::{Datelike, Local, NaiveDateTime};
use shiftplan::config::Settings;
use shiftplan::directory::Directory;
use shiftplan::models::{NewShift, Shift};
use shiftplan::trades::{TradeDecision, TradeRequest};
use shiftplan::{
    shifts, InMemoryShiftStore, PlanError, ReplicationOutcome, ReplicationPlanner,
    ReplicationRequest, ShiftStore,
};
use std::io::{self, Write};
use tracing::error;
use tracing_subscriber::EnvFilter;

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

struct ShiftCLI {
    settings: Settings,
    directory: Directory,
    store: InMemoryShiftStore,
    trades: Vec<TradeRequest>,
    running: bool,
}

impl ShiftCLI {
    fn new(settings: Settings) -> Self {
        let directory = if settings.seed_directory {
            Directory::seeded()
        } else {
            Directory::new()
        };

        ShiftCLI {
            settings,
            directory,
            store: InMemoryShiftStore::new(),
            trades: Vec::new(),
            running: true,
        }
    }

    fn print_header(&self) {
        println!("\n{}", "=".repeat(60));
        println!("       HOSPITAL SHIFT PLANNER");
        println!("{}", "=".repeat(60));
    }

    fn print_menu(&self) {
        println!("\n--- Main Menu ---");
        println!("1. Replicate shifts for a month");
        println!("2. Schedule single shift");
        println!("3. Reschedule shift");
        println!("4. Cancel shift");
        println!("5. Delete shift");
        println!("6. View shifts of a professional");
        println!("7. Request shift trade");
        println!("8. Review pending trades");
        println!("9. Replicate from JSON file");
        println!("10. Run demo");
        println!("11. Exit");
        println!("{}", "-".repeat(20));
    }

    fn get_input(&self, prompt: &str, default: Option<&str>) -> io::Result<String> {
        if let Some(def) = default {
            print!("{} [{}]: ", prompt, def);
        } else {
            print!("{}: ", prompt);
        }
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        let input = input.trim();

        if input.is_empty() {
            Ok(default.unwrap_or("").to_string())
        } else {
            Ok(input.to_string())
        }
    }

    fn get_int_input(&self, prompt: &str, default: Option<i64>) -> io::Result<i64> {
        loop {
            let default_str = default.map(|d| d.to_string());
            let input = self.get_input(prompt, default_str.as_deref())?;

            if let Ok(value) = input.parse::<i64>() {
                return Ok(value);
            }
            println!("Please enter a valid number");
        }
    }

    fn get_datetime_input(&self, prompt: &str) -> io::Result<NaiveDateTime> {
        loop {
            let input = self.get_input(&format!("{} (YYYY-MM-DD HH:MM)", prompt), None)?;
            match NaiveDateTime::parse_from_str(&input, "%Y-%m-%d %H:%M") {
                Ok(value) => return Ok(value),
                Err(_) => println!("Please enter a date like 2025-09-01 07:00"),
            }
        }
    }

    /// Pick hospital, group and professional from the directory.
    fn choose_assignment(&self) -> io::Result<Option<(String, String, String)>> {
        let hospitals = self.directory.hospitals();
        if hospitals.is_empty() {
            println!("\nNo hospitals registered");
            return Ok(None);
        }
        println!("\nHospitals:");
        for (i, h) in hospitals.iter().enumerate() {
            println!("  {}. {} ({})", i + 1, h.name, h.city);
        }
        let Some(hospital) = pick(&hospitals, self.get_int_input("Select hospital", Some(1))?) else {
            println!("Invalid choice");
            return Ok(None);
        };

        let groups = self.directory.groups_of(&hospital.id);
        println!("\nGroups:");
        for (i, g) in groups.iter().enumerate() {
            println!("  {}. {}", i + 1, g.name);
        }
        let Some(group) = pick(&groups, self.get_int_input("Select group", Some(1))?) else {
            println!("Invalid choice");
            return Ok(None);
        };

        let members = self.directory.members_of(&group.id);
        if members.is_empty() {
            println!("\nNo active professionals in {}", group.name);
            return Ok(None);
        }
        println!("\nProfessionals:");
        for (i, p) in members.iter().enumerate() {
            println!("  {}. {}", i + 1, p.name);
        }
        let Some(professional) = pick(&members, self.get_int_input("Select professional", Some(1))?)
        else {
            println!("Invalid choice");
            return Ok(None);
        };

        Ok(Some((
            hospital.id.clone(),
            group.id.clone(),
            professional.id.clone(),
        )))
    }

    fn replicate(&mut self) -> io::Result<()> {
        println!("\n--- Replicate Shifts For The Month ---");

        let Some((hospital_id, group_id, user_id)) = self.choose_assignment()? else {
            return Ok(());
        };

        let start_time = self.get_input("Start time", Some(self.settings.default_start_time.as_str()))?;
        let end_time = self.get_input("End time", Some(self.settings.default_end_time.as_str()))?;

        println!("\nDays of the week:");
        for (i, name) in DAY_NAMES.iter().enumerate() {
            println!("  {}. {}", i, name);
        }
        let day_of_week = self.get_int_input("Select day", Some(1))?;

        let today = Local::now().date_naive();
        let month = self.get_int_input("Month (1-12)", Some(i64::from(today.month())))?;
        let year = self.get_int_input("Year", Some(i64::from(today.year())))?;
        let notes = self.get_input("Notes", Some(""))?;

        let request = ReplicationRequest {
            hospital_id: Some(hospital_id),
            group_id: Some(group_id),
            user_id: Some(user_id),
            start_time: Some(start_time),
            end_time: Some(end_time),
            day_of_week: Some(day_of_week),
            month: Some(month),
            year: Some(year),
            notes: Some(notes),
        };

        self.run_replication(request);
        Ok(())
    }

    fn run_replication(&mut self, payload: ReplicationRequest) {
        let request = match payload.validate() {
            Ok(request) => request,
            Err(e) => {
                println!("\nInvalid request: {}", e);
                return;
            }
        };

        if let Err(e) = self.directory.check_assignment(
            request.hospital_id(),
            request.group_id(),
            request.user_id(),
        ) {
            println!("\nInvalid assignment: {}", e);
            return;
        }

        if let Ok(candidates) = ReplicationPlanner::<InMemoryShiftStore>::preview(&request) {
            let dates: Vec<String> = candidates
                .iter()
                .map(|c| c.date.format("%d/%m").to_string())
                .collect();
            println!("\nCandidate dates: {}", dates.join(", "));
        }

        match ReplicationPlanner::new(&mut self.store).plan(&request) {
            Ok(outcome) => print_outcome(&outcome),
            Err(PlanError::Store {
                date,
                source,
                outcome,
            }) => {
                error!(%date, error = %source, "Replication failed");
                println!("\nProcessed up to {}, then the store failed: {}", date, source);
                print_outcome(&outcome);
            }
            Err(e) => println!("\nReplication failed: {}", e),
        }
    }

    fn replicate_from_json(&mut self) -> io::Result<()> {
        println!("\n--- Replicate From JSON File ---");

        let path = self.get_input("Path to request file", Some("replicate.json"))?;
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                println!("\nCannot read {}: {}", path, e);
                return Ok(());
            }
        };

        let payload: ReplicationRequest = match serde_json::from_str(&contents) {
            Ok(payload) => payload,
            Err(e) => {
                println!("\nMalformed request: {}", e);
                return Ok(());
            }
        };

        let request = match payload.validate().and_then(|request| {
            self.directory
                .check_assignment(request.hospital_id(), request.group_id(), request.user_id())
                .map(|_| request)
        }) {
            Ok(request) => request,
            Err(e) => {
                println!("{}", serde_json::json!({ "error": e.to_string() }));
                return Ok(());
            }
        };

        let response = match ReplicationPlanner::new(&mut self.store).plan(&request) {
            Ok(outcome) => serde_json::to_value(&outcome),
            Err(PlanError::Store {
                date,
                source,
                outcome,
            }) => Ok(serde_json::json!({
                "error": source.to_string(),
                "failedOn": date,
                "partial": outcome,
            })),
            Err(e) => Ok(serde_json::json!({ "error": e.to_string() })),
        };

        match response.and_then(|v| serde_json::to_string_pretty(&v)) {
            Ok(text) => println!("{}", text),
            Err(e) => println!("\nCannot render outcome: {}", e),
        }
        Ok(())
    }

    fn schedule_single(&mut self) -> io::Result<()> {
        println!("\n--- Schedule Single Shift ---");

        let Some((hospital_id, group_id, user_id)) = self.choose_assignment()? else {
            return Ok(());
        };
        let start = self.get_datetime_input("Start")?;
        let end = self.get_datetime_input("End")?;
        let notes = self.get_input("Notes", Some(""))?;

        let shift = match NewShift::new(hospital_id, group_id, user_id, start, end, Some(notes)) {
            Ok(shift) => shift,
            Err(e) => {
                println!("\nInvalid shift: {}", e);
                return Ok(());
            }
        };

        match shifts::schedule_shift(&mut self.store, shift) {
            Ok(created) => println!(
                "\nShift scheduled: {} - {}",
                created.start.format("%Y-%m-%d %H:%M"),
                created.end.format("%H:%M")
            ),
            Err(e) => println!("\nCould not schedule shift: {}", e),
        }
        Ok(())
    }

    /// List every stored shift and let the user pick one.
    fn choose_shift(&self, title: &str) -> io::Result<Option<Shift>> {
        let all = self.store.shifts();
        if all.is_empty() {
            println!("\nNo shifts stored");
            return Ok(None);
        }

        println!("\n--- {} ---", title);
        for (i, shift) in all.iter().enumerate() {
            println!(
                "  {}. {} {} - {} ({})",
                i + 1,
                self.professional_name(&shift.user_id),
                shift.start.format("%Y-%m-%d %H:%M"),
                shift.end.format("%H:%M"),
                shift.status.name()
            );
        }

        let choice = self.get_int_input("Select shift (0 to go back)", Some(0))?;
        if choice == 0 {
            return Ok(None);
        }
        let shift = pick(&all, choice).cloned();
        if shift.is_none() {
            println!("Invalid choice");
        }
        Ok(shift)
    }

    fn reschedule_shift(&mut self) -> io::Result<()> {
        let Some(shift) = self.choose_shift("Reschedule Shift")? else {
            return Ok(());
        };
        let start = self.get_datetime_input("New start")?;
        let end = self.get_datetime_input("New end")?;

        match shifts::reschedule_shift(&mut self.store, &shift.id, start, end) {
            Ok(moved) => println!(
                "\nShift moved to {} - {}",
                moved.start.format("%Y-%m-%d %H:%M"),
                moved.end.format("%H:%M")
            ),
            Err(e) => println!("\nCould not reschedule shift: {}", e),
        }
        Ok(())
    }

    fn cancel_shift(&mut self) -> io::Result<()> {
        let Some(shift) = self.choose_shift("Cancel Shift")? else {
            return Ok(());
        };

        match shifts::cancel_shift(&mut self.store, &shift.id) {
            Ok(_) => println!("\nShift cancelled, the time slot is free again"),
            Err(e) => println!("\nFailed to cancel shift: {}", e),
        }
        Ok(())
    }

    fn delete_shift(&mut self) -> io::Result<()> {
        let Some(shift) = self.choose_shift("Delete Shift")? else {
            return Ok(());
        };
        let confirm = self.get_input("Delete this shift permanently? (y/n)", Some("n"))?;
        if !confirm.eq_ignore_ascii_case("y") {
            return Ok(());
        }

        match shifts::delete_shift(&mut self.store, &shift.id) {
            Ok(_) => println!("\nShift deleted"),
            Err(e) => println!("\nFailed to delete shift: {}", e),
        }
        Ok(())
    }

    fn view_shifts(&self) -> io::Result<()> {
        let user_id = self.get_input("Professional id", Some("user-john-doe"))?;

        let shifts = match self.store.shifts_for_user(&user_id) {
            Ok(shifts) => shifts,
            Err(e) => {
                println!("\nCannot load shifts: {}", e);
                return Ok(());
            }
        };

        if shifts.is_empty() {
            println!("\nNo shifts for {}", self.professional_name(&user_id));
            return Ok(());
        }

        println!(
            "\n--- Shifts of {} ({}) ---",
            self.professional_name(&user_id),
            shifts.len()
        );
        let mut current_month = None;
        for shift in shifts {
            let month = (shift.start.year(), shift.start.month());
            if Some(month) != current_month {
                current_month = Some(month);
                println!("\n{}:", shift.start.format("%B %Y"));
            }
            println!(
                "  {} {} - {} [{}] {}",
                shift.start.format("%a %d"),
                shift.start.format("%H:%M"),
                shift.end.format("%H:%M"),
                shift.status.name(),
                shift.notes.as_deref().unwrap_or("")
            );
        }
        Ok(())
    }

    fn request_trade(&mut self) -> io::Result<()> {
        println!("\n--- Request Shift Trade ---");

        let shifts: Vec<_> = self
            .store
            .shifts()
            .into_iter()
            .filter(|s| s.status.blocks_time())
            .collect();
        if shifts.is_empty() {
            println!("\nNo shifts available for trade");
            return Ok(());
        }
        for (i, shift) in shifts.iter().enumerate() {
            println!(
                "  {}. {} {}",
                i + 1,
                self.professional_name(&shift.user_id),
                shift.start.format("%Y-%m-%d %H:%M")
            );
        }
        let Some(shift) = pick(&shifts, self.get_int_input("Select shift", Some(1))?) else {
            println!("Invalid choice");
            return Ok(());
        };

        let target = self.get_input("Hand over to professional id", None)?;
        if let Err(e) = self
            .directory
            .check_assignment(&shift.hospital_id, &shift.group_id, target.trim())
        {
            println!("\nCannot request trade: {}", e);
            return Ok(());
        }
        match TradeRequest::new(shift.id.clone(), shift.user_id.clone(), target) {
            Ok(trade) => {
                println!("\nTrade {} is pending review", &trade.id[..8]);
                self.trades.push(trade);
            }
            Err(e) => println!("\nCannot request trade: {}", e),
        }
        Ok(())
    }

    fn review_trades(&mut self) -> io::Result<()> {
        let pending: Vec<usize> = self
            .trades
            .iter()
            .enumerate()
            .filter(|(_, t)| t.status == shiftplan::trades::TradeStatus::Pending)
            .map(|(i, _)| i)
            .collect();

        if pending.is_empty() {
            println!("\nNo pending trades");
            return Ok(());
        }

        println!("\n--- Pending Trades ---");
        for (n, &i) in pending.iter().enumerate() {
            let trade = &self.trades[i];
            println!(
                "  {}. {} -> {} (shift {}...)",
                n + 1,
                self.professional_name(&trade.requester_id),
                self.professional_name(&trade.target_user_id),
                &trade.shift_id[..8.min(trade.shift_id.len())]
            );
        }

        let Some(&index) = pick(&pending, self.get_int_input("Select trade", Some(1))?) else {
            println!("Invalid choice");
            return Ok(());
        };
        let decision = match self.get_input("Approve or reject? (a/r)", Some("a"))?.as_str() {
            "r" | "R" => TradeDecision::Reject,
            _ => TradeDecision::Approve,
        };
        let notes = self.get_input("Admin notes", Some(""))?;

        let trade = &mut self.trades[index];
        match trade.review(decision, Some(notes), &self.directory, &mut self.store) {
            Ok(_) => println!("\nTrade {}", trade.status.name()),
            Err(e) => println!("\nCannot review trade: {}", e),
        }
        Ok(())
    }

    fn run_demo(&mut self) {
        println!("\n--- Running Demo ---");

        let today = Local::now().date_naive();
        let request = ReplicationRequest {
            hospital_id: Some("hospital-srn".to_string()),
            group_id: Some("hospital-srn-plantonista-ortopedia".to_string()),
            user_id: Some("user-john-doe".to_string()),
            start_time: Some(self.settings.default_start_time.clone()),
            end_time: Some(self.settings.default_end_time.clone()),
            day_of_week: Some(1),
            month: Some(i64::from(today.month())),
            year: Some(i64::from(today.year())),
            notes: Some("Plantão diurno".to_string()),
        };

        if self.directory.professional("user-john-doe").is_none() {
            self.directory = Directory::seeded();
        }

        println!("Replicating Monday shifts for John Doe this month...");
        self.run_replication(request.clone());

        println!("\nRunning the same replication again...");
        self.run_replication(request);

        println!("\nNote: the second run created nothing, every Monday was");
        println!("already taken by the shifts of the first run.");
    }

    fn professional_name(&self, user_id: &str) -> String {
        self.directory
            .professional(user_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| user_id.to_string())
    }

    fn run(&mut self) -> io::Result<()> {
        self.print_header();

        while self.running {
            self.print_menu();

            let choice = self.get_int_input("Enter choice", Some(10))?;

            match choice {
                1 => self.replicate()?,
                2 => self.schedule_single()?,
                3 => self.reschedule_shift()?,
                4 => self.cancel_shift()?,
                5 => self.delete_shift()?,
                6 => self.view_shifts()?,
                7 => self.request_trade()?,
                8 => self.review_trades()?,
                9 => self.replicate_from_json()?,
                10 => self.run_demo(),
                11 => {
                    self.running = false;
                    println!("\nGoodbye!");
                }
                _ => println!("Invalid choice"),
            }
        }
        Ok(())
    }
}

/// One-based menu selection.
fn pick<T>(items: &[T], choice: i64) -> Option<&T> {
    usize::try_from(choice)
        .ok()
        .and_then(|c| c.checked_sub(1))
        .and_then(|i| items.get(i))
}

fn print_outcome(outcome: &ReplicationOutcome) {
    println!("\n--- Replication Results ---");
    println!("  Created: {}", outcome.created_count);
    println!("  Skipped: {}", outcome.skipped.len());

    if !outcome.created.is_empty() {
        println!("\nCreated shifts:");
        for shift in &outcome.created {
            println!(
                "  - {} {} - {}",
                shift.start.format("%A, %Y-%m-%d"),
                shift.start.format("%H:%M"),
                shift.end.format("%H:%M")
            );
        }
    }

    if !outcome.skipped.is_empty() {
        println!("\nSkipped dates:");
        for skipped in &outcome.skipped {
            println!("  - {}: {:?}", skipped.date.format("%A, %Y-%m-%d"), skipped.reason);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    tracing::info!(?settings, "Configuration loaded");

    let mut cli = ShiftCLI::new(settings);
    match cli.run() {
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(()),
        other => Ok(other?),
    }
}
