use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc, Weekday};
use clinic_waitlist::workflows::waitlist::{
    AppointmentTypeId, AppointmentTypeSummary, AvailableSlot, BusinessId, BusinessSummary,
    DayOfWeek, InMemoryClinicStore, PatientId, PatientSummary, PractitionerId,
    PractitionerSummary, SlotId, TimeOfDay, Urgency, WaitlistEntry, WaitlistEntryId,
    WaitlistPreferences, WaitlistStatus,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeSet;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

const SLOT_DAYS: i64 = 14;
const CLINIC_HOURS: [u32; 6] = [9, 10, 11, 14, 15, 16];
const LATE_NIGHT_HOURS: [u32; 2] = [18, 19];

fn business(id: &str, name: &str, city: &str) -> BusinessSummary {
    BusinessSummary {
        id: BusinessId::from(id),
        name: name.to_string(),
        city: city.to_string(),
    }
}

fn appointment_type(id: &str, name: &str, minutes: u32, color: &str) -> AppointmentTypeSummary {
    AppointmentTypeSummary {
        id: AppointmentTypeId::from(id),
        name: name.to_string(),
        duration_minutes: minutes,
        color: color.to_string(),
    }
}

struct DemoPractitioner {
    summary: PractitionerSummary,
    business: BusinessSummary,
    types: Vec<AppointmentTypeSummary>,
}

struct DemoCatalog {
    main: BusinessSummary,
    north: BusinessSummary,
    initial: AppointmentTypeSummary,
    follow_up: AppointmentTypeSummary,
    massage: AppointmentTypeSummary,
    extended: AppointmentTypeSummary,
}

impl DemoCatalog {
    fn new() -> Self {
        Self {
            main: business("biz-main", "Main Clinic", "Melbourne"),
            north: business("biz-north", "North Branch", "Preston"),
            initial: appointment_type("type-initial", "Initial Consultation", 60, "#4F46E5"),
            follow_up: appointment_type("type-follow-up", "Follow-up", 30, "#10B981"),
            massage: appointment_type("type-massage", "Massage Therapy", 60, "#F59E0B"),
            extended: appointment_type("type-extended", "Extended Treatment", 90, "#EC4899"),
        }
    }

    fn practitioners(&self) -> Vec<DemoPractitioner> {
        let person = |id: &str, first: &str, last: &str, title: Option<&str>, role: &str| {
            PractitionerSummary {
                id: PractitionerId::from(id),
                first_name: first.to_string(),
                last_name: last.to_string(),
                title: title.map(str::to_string),
                designation: Some(role.to_string()),
            }
        };
        let general = vec![
            self.initial.clone(),
            self.follow_up.clone(),
            self.extended.clone(),
        ];

        vec![
            DemoPractitioner {
                summary: person("prac-sarah", "Sarah", "Johnson", Some("Dr"), "Physiotherapist"),
                business: self.main.clone(),
                types: general.clone(),
            },
            DemoPractitioner {
                summary: person("prac-michael", "Michael", "Chen", None, "Massage Therapist"),
                business: self.main.clone(),
                types: vec![self.massage.clone()],
            },
            DemoPractitioner {
                summary: person("prac-emma", "Emma", "Williams", Some("Dr"), "Chiropractor"),
                business: self.north.clone(),
                types: general,
            },
        ]
    }
}

/// In-memory store seeded with the demo clinic relative to `now`.
pub(crate) fn demo_store(now: DateTime<Utc>, clinic_offset: FixedOffset) -> InMemoryClinicStore {
    InMemoryClinicStore::with_records(
        demo_entries(now),
        demo_slots(now, clinic_offset),
    )
}

pub(crate) fn demo_entries(now: DateTime<Utc>) -> Vec<WaitlistEntry> {
    let catalog = DemoCatalog::new();
    let day_set = |days: &[DayOfWeek]| days.iter().copied().collect::<BTreeSet<_>>();
    let weekdays = day_set(&[
        DayOfWeek::Mon,
        DayOfWeek::Tue,
        DayOfWeek::Wed,
        DayOfWeek::Thu,
        DayOfWeek::Fri,
    ]);

    let rows = [
        (
            "wl-001",
            ("John", "Smith"),
            &catalog.initial,
            Urgency::Urgent,
            WaitlistPreferences {
                available_days: day_set(&[DayOfWeek::Mon, DayOfWeek::Wed, DayOfWeek::Fri]),
                preferred_times: BTreeSet::from([TimeOfDay::Morning]),
                preferred_practitioners: BTreeSet::from([PractitionerId::from("prac-sarah")]),
                preferred_businesses: BTreeSet::from([catalog.main.id.clone()]),
                outside_business_hours_only: false,
            },
            "Severe lower back pain, referred by GP",
            (7, 14),
        ),
        (
            "wl-002",
            ("Emily", "Davis"),
            &catalog.follow_up,
            Urgency::Normal,
            WaitlistPreferences {
                available_days: day_set(&[DayOfWeek::Tue, DayOfWeek::Thu]),
                preferred_times: BTreeSet::from([TimeOfDay::Afternoon]),
                ..WaitlistPreferences::default()
            },
            "Follow-up after knee surgery",
            (12, 21),
        ),
        (
            "wl-003",
            ("Robert", "Wilson"),
            &catalog.massage,
            Urgency::High,
            WaitlistPreferences {
                available_days: weekdays.clone(),
                preferred_practitioners: BTreeSet::from([PractitionerId::from("prac-michael")]),
                preferred_businesses: BTreeSet::from([
                    catalog.main.id.clone(),
                    catalog.north.id.clone(),
                ]),
                ..WaitlistPreferences::default()
            },
            "Sports injury, needs a session before the weekend game",
            (5, 30),
        ),
        (
            "wl-004",
            ("Lisa", "Brown"),
            &catalog.initial,
            Urgency::Low,
            WaitlistPreferences {
                available_days: day_set(&[DayOfWeek::Wed, DayOfWeek::Fri]),
                preferred_practitioners: BTreeSet::from([PractitionerId::from("prac-emma")]),
                preferred_businesses: BTreeSet::from([catalog.north.id.clone()]),
                outside_business_hours_only: true,
                ..WaitlistPreferences::default()
            },
            "Works full time, evenings only",
            (3, 45),
        ),
        (
            "wl-005",
            ("David", "Taylor"),
            &catalog.extended,
            Urgency::Normal,
            WaitlistPreferences {
                available_days: day_set(&[DayOfWeek::Mon, DayOfWeek::Wed]),
                preferred_times: BTreeSet::from([TimeOfDay::Morning, TimeOfDay::Afternoon]),
                preferred_businesses: BTreeSet::from([catalog.main.id.clone()]),
                ..WaitlistPreferences::default()
            },
            "Chronic shoulder condition",
            (15, 28),
        ),
        (
            "wl-006",
            ("Sophie", "Anderson"),
            &catalog.follow_up,
            Urgency::High,
            WaitlistPreferences {
                available_days: weekdays,
                ..WaitlistPreferences::default()
            },
            "Post-operative review due this week",
            (2, 7),
        ),
    ];

    rows.into_iter()
        .enumerate()
        .map(
            |(index, (id, (first, last), kind, urgency, preferences, notes, (age, ttl)))| {
                WaitlistEntry {
                    id: WaitlistEntryId::from(id),
                    patient: PatientSummary {
                        id: PatientId(format!("pat-{:03}", index + 1)),
                        first_name: first.to_string(),
                        last_name: last.to_string(),
                        email: Some(format!(
                            "{}.{}@example.com",
                            first.to_ascii_lowercase(),
                            last.to_ascii_lowercase()
                        )),
                        phone: Some(format!("0400 000 {:03}", index + 1)),
                    },
                    appointment_type: kind.clone(),
                    urgency,
                    status: WaitlistStatus::Active,
                    preferences,
                    notes: Some(notes.to_string()),
                    created_at: now - Duration::days(age),
                    expires_at: now + Duration::days(ttl),
                    booked_at: None,
                }
            },
        )
        .collect()
}

/// Two weeks of openings starting the clinic day after `now`. Sundays are closed and
/// Wednesdays run late. Roughly a third of the grid is left out, by a fixed pattern.
pub(crate) fn demo_slots(now: DateTime<Utc>, clinic_offset: FixedOffset) -> Vec<AvailableSlot> {
    let catalog = DemoCatalog::new();
    let first_day = now.with_timezone(&clinic_offset).date_naive() + Duration::days(1);
    let mut slots = Vec::new();

    for (practitioner_index, practitioner) in catalog.practitioners().iter().enumerate() {
        for day_index in 0..SLOT_DAYS {
            let date = first_day + Duration::days(day_index);
            if date.weekday() == Weekday::Sun {
                continue;
            }

            let late: &[u32] = if date.weekday() == Weekday::Wed {
                &LATE_NIGHT_HOURS[..]
            } else {
                &[]
            };
            for &hour in CLINIC_HOURS.iter().chain(late) {
                let seed = practitioner_index + day_index as usize + hour as usize;
                if seed % 3 == 0 {
                    continue;
                }
                let kind = &practitioner.types[seed % practitioner.types.len()];
                let Some(starts_at) = clinic_time(date, hour, clinic_offset) else {
                    continue;
                };
                slots.push(AvailableSlot {
                    id: SlotId(format!(
                        "slot-{}-{}-{:02}00",
                        practitioner.summary.last_name.to_ascii_lowercase(),
                        date.format("%Y%m%d"),
                        hour
                    )),
                    practitioner: practitioner.summary.clone(),
                    business: practitioner.business.clone(),
                    appointment_type: kind.clone(),
                    starts_at,
                    ends_at: starts_at + Duration::minutes(i64::from(kind.duration_minutes)),
                    duration_minutes: kind.duration_minutes,
                    is_booked: false,
                });
            }
        }
    }

    slots
}

fn clinic_time(date: NaiveDate, hour: u32, clinic_offset: FixedOffset) -> Option<DateTime<Utc>> {
    let local = date.and_hms_opt(hour, 0, 0)?;
    clinic_offset
        .from_local_datetime(&local)
        .single()
        .map(|time| time.with_timezone(&Utc))
}

/// Accepts RFC 3339 timestamps or a bare `YYYY-MM-DD` (midnight UTC).
pub(crate) fn parse_datetime(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| Utc.from_utc_datetime(&midnight))
        .ok_or_else(|| format!("failed to parse '{raw}' as RFC 3339 or YYYY-MM-DD"))
}
