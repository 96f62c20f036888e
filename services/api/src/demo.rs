use crate::infra::demo_store;
use chrono::{DateTime, FixedOffset, Utc};
use clap::Args;
use clinic_waitlist::config::AppConfig;
use clinic_waitlist::error::AppError;
use clinic_waitlist::workflows::waitlist::{
    DashboardOverview, FixedClock, InMemoryClinicStore, MatchResult, WaitlistEntryId,
    WaitlistMatchingService,
};
use std::sync::Arc;

const DEFAULT_DEMO_MATCHES: usize = 5;

type DemoService = WaitlistMatchingService<InMemoryClinicStore, InMemoryClinicStore>;

#[derive(Args, Debug, Default)]
pub(crate) struct MatchesArgs {
    /// Number of matches to print (defaults to the configured top-matches limit)
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Only list slots for this waitlist entry
    #[arg(long)]
    pub(crate) entry: Option<String>,
    /// Evaluate as of this instant (RFC 3339 or YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_datetime)]
    pub(crate) now: Option<DateTime<Utc>>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluate as of this instant (RFC 3339 or YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_datetime)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Number of top matches to show before booking
    #[arg(long)]
    pub(crate) limit: Option<usize>,
}

fn demo_service(now: DateTime<Utc>) -> Result<(DemoService, FixedOffset), AppError> {
    let config = AppConfig::load()?;
    let offset = config.matching.clinic_offset;
    let store = Arc::new(demo_store(now, offset));
    let service = WaitlistMatchingService::with_clock(
        store.clone(),
        store,
        config.matching,
        Arc::new(FixedClock(now)),
    );
    Ok((service, offset))
}

pub(crate) fn run_matches(args: MatchesArgs) -> Result<(), AppError> {
    let MatchesArgs { limit, entry, now } = args;
    let now = now.unwrap_or_else(Utc::now);
    let (service, offset) = demo_service(now)?;

    match entry {
        Some(raw) => {
            let entry_id = WaitlistEntryId(raw);
            let mut matches = service.find_matches_for_entry(&entry_id)?;
            let found = matches.len();
            if let Some(limit) = limit {
                matches.truncate(limit);
            }
            println!("Open slots for waitlist entry {entry_id} ({found} found)");
            print_matches(&matches, offset);
        }
        None => {
            let matches = service.top_matches(limit)?;
            println!("Top waitlist matches as of {}", now.to_rfc3339());
            print_matches(&matches, offset);
        }
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let now = args.now.unwrap_or_else(Utc::now);
    let limit = args.limit.unwrap_or(DEFAULT_DEMO_MATCHES);
    let (service, offset) = demo_service(now)?;

    println!("== Clinic waitlist demo ({}) ==", now.to_rfc3339());
    println!();
    println!("Before booking");
    print_overview(&service.overview()?);

    let top = service.top_matches(Some(limit))?;
    println!();
    println!("Top {} matches", top.len());
    print_matches(&top, offset);

    let Some(best) = top.first() else {
        println!("No waitlist entry fits the open slots; nothing to book.");
        return Ok(());
    };

    println!();
    println!(
        "Booking {} into {}",
        best.entry.patient.full_name(),
        best.slot.id
    );
    match service.book_match(&best.entry.id, &best.slot.id) {
        Ok(appointment) => println!(
            "  booked appointment {} ({} to {})",
            appointment.id,
            appointment.starts_at.with_timezone(&offset).format("%a %d %b %H:%M"),
            appointment.ends_at.with_timezone(&offset).format("%H:%M"),
        ),
        Err(error) => println!("  booking failed ({:?}): {error}", error.kind()),
    }

    match service.book_match(&best.entry.id, &best.slot.id) {
        Ok(appointment) => println!("  repeat booking unexpectedly created {}", appointment.id),
        Err(error) => println!("  repeat booking rejected ({:?}): {error}", error.kind()),
    }

    println!();
    println!("After booking");
    print_overview(&service.overview()?);

    let remaining = service.top_matches(Some(limit))?;
    println!();
    println!("Top {} matches after booking", remaining.len());
    print_matches(&remaining, offset);

    Ok(())
}

fn print_overview(overview: &DashboardOverview) {
    println!("  active waitlist:          {}", overview.active_waitlist);
    println!("  urgent or high priority:  {}", overview.urgent_waitlist);
    println!("  available slots:          {}", overview.available_slots);
    println!("  potential matches:        {}", overview.potential_matches);
    println!(
        "  booked from waitlist:     {}",
        overview.recent_bookings_from_waitlist
    );
}

fn print_matches(matches: &[MatchResult], offset: FixedOffset) {
    if matches.is_empty() {
        println!("  (no matches)");
        return;
    }

    for (index, result) in matches.iter().enumerate() {
        println!(
            "{:>3}. [{:>3}] {} ({}) -> {} at {}, {} [{}]",
            index + 1,
            result.score,
            result.entry.patient.full_name(),
            result.entry.urgency.label(),
            result.slot.practitioner.full_name(),
            result.slot.business.name,
            result
                .slot
                .starts_at
                .with_timezone(&offset)
                .format("%a %d %b %H:%M"),
            result.slot.appointment_type.name,
        );
        if !result.reasons.is_empty() {
            let reasons: Vec<String> =
                result.reasons.iter().map(|reason| reason.summary()).collect();
            println!("       {}", reasons.join("; "));
        }
    }
}
