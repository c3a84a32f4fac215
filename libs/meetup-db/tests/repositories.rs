//! Repository tests against a real PostgreSQL.
//!
//! Run with `DATABASE_URL=postgres://... cargo test -p meetup-db -- --ignored`;
//! `sqlx::test` creates a scratch database per test and applies the migrations.

use chrono::{NaiveDate, NaiveTime};
use meetup_db::models::donation::NewDonation;
use meetup_db::models::guest::GuestProfile;
use meetup_db::models::schedule::SpeechField;
use meetup_db::repositories::Repositories;
use meetup_db::sqlx::PgPool;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

fn profile(tg_id: i64, name: &str, open: bool) -> GuestProfile {
    GuestProfile {
        tg_id,
        name: name.to_string(),
        phone: "+79990000000".to_string(),
        kind_activity: "Backend".to_string(),
        projects: "meetup bot".to_string(),
        open_for_contact: open,
    }
}

async fn active_event_count(pool: &PgPool) -> i64 {
    meetup_db::sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events WHERE active = TRUE")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test]
#[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
async fn guest_upsert_is_idempotent(pool: PgPool) {
    let repos = Repositories::new(pool.clone());

    let first = repos.guests.upsert(&profile(100, "Ann", false)).await.unwrap();
    let second = repos.guests.upsert(&profile(100, "Ann", false)).await.unwrap();
    assert_eq!(first.id, second.id);

    let updated = repos.guests.upsert(&profile(100, "Ann Lee", true)).await.unwrap();
    assert_eq!(updated.id, first.id);
    assert_eq!(updated.name, "Ann Lee");
    assert!(updated.open_for_contact);

    let rows = meetup_db::sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM guests")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[sqlx::test]
#[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
async fn speaker_upsert_keeps_profile(pool: PgPool) {
    let repos = Repositories::new(pool);
    repos.guests.upsert(&profile(7, "Bob", true)).await.unwrap();

    let speaker = repos.guests.upsert_speaker(7, "Robert").await.unwrap();
    assert_eq!(speaker.name, "Robert");
    assert_eq!(speaker.phone, "+79990000000");
    assert!(speaker.open_for_contact);
}

#[sqlx::test]
#[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
async fn new_event_gets_template_schedule(pool: PgPool) {
    let repos = Repositories::new(pool);
    let event = repos.events.create_with_template("Chat-bots", date(14)).await.unwrap();

    let speeches = repos.schedules.for_event(event.id).await.unwrap();
    assert_eq!(speeches.len(), 7);
    assert_eq!(speeches[0].start_at, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
    assert_eq!(speeches[3].topic, "Break");
    assert!(speeches.iter().all(|s| !s.active && s.speaker_id.is_none()));
}

#[sqlx::test]
#[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
async fn set_active_event_leaves_exactly_one(pool: PgPool) {
    let repos = Repositories::new(pool.clone());
    let a = repos.events.create_with_template("A", date(1)).await.unwrap();
    let b = repos.events.create_with_template("B", date(2)).await.unwrap();
    let c = repos.events.create_with_template("C", date(3)).await.unwrap();

    repos.events.set_active(a.id).await.unwrap();
    let tasks = [b.id, c.id, a.id, b.id, c.id].map(|id| {
        let events = repos.events.clone();
        tokio::spawn(async move { events.set_active(id).await })
    });
    for result in futures::future::join_all(tasks).await {
        assert!(result.unwrap().unwrap().is_some());
    }

    assert_eq!(active_event_count(&pool).await, 1);
}

#[sqlx::test]
#[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
async fn set_active_unknown_event_keeps_current(pool: PgPool) {
    let repos = Repositories::new(pool.clone());
    let a = repos.events.create_with_template("A", date(1)).await.unwrap();
    repos.events.set_active(a.id).await.unwrap();

    assert!(repos.events.set_active(a.id + 1000).await.unwrap().is_none());
    let active = repos.events.get_active().await.unwrap().unwrap();
    assert_eq!(active.id, a.id);
    assert_eq!(active_event_count(&pool).await, 1);
}

#[sqlx::test]
#[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
async fn set_active_speech_switches_across_events(pool: PgPool) {
    let repos = Repositories::new(pool);
    let a = repos.events.create_with_template("A", date(1)).await.unwrap();
    let b = repos.events.create_with_template("B", date(2)).await.unwrap();
    let first = repos.schedules.for_event(a.id).await.unwrap()[0].clone();
    let second = repos.schedules.for_event(b.id).await.unwrap()[1].clone();

    repos.schedules.set_active(first.id).await.unwrap();
    let now = repos.schedules.set_active(second.id).await.unwrap().unwrap();
    assert!(now.active);

    assert_eq!(repos.schedules.get_active().await.unwrap().unwrap().id, second.id);
    assert!(repos.schedules.get_active_for_event(a.id).await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
async fn speech_editing_round_trip(pool: PgPool) {
    let repos = Repositories::new(pool);
    let event = repos.events.create_with_template("A", date(1)).await.unwrap();
    let speech = repos.schedules.create(event.id).await.unwrap();
    assert_eq!(speech.topic, "New...");

    let start = NaiveTime::from_hms_opt(17, 30, 0).unwrap();
    let edited = repos
        .schedules
        .update_field(speech.id, &SpeechField::Start(start))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(edited.start_at, start);

    let speaker = repos.guests.upsert_speaker(55, "Carol").await.unwrap();
    let with_speaker = repos.schedules.set_speaker(speech.id, speaker.id).await.unwrap().unwrap();
    assert_eq!(with_speaker.speaker_name.as_deref(), Some("Carol"));
    assert_eq!(repos.events.speaker_ids(event.id).await.unwrap(), vec![55]);

    assert_eq!(repos.schedules.delete(speech.id).await.unwrap(), Some(event.id));
    assert!(repos.schedules.delete(speech.id).await.unwrap().is_none());
    assert!(
        repos
            .schedules
            .update_field(speech.id, &SpeechField::Topic("gone".into()))
            .await
            .unwrap()
            .is_none()
    );
}

#[sqlx::test]
#[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
async fn questions_reach_the_speaker(pool: PgPool) {
    let repos = Repositories::new(pool);
    let event = repos.events.create_with_template("A", date(1)).await.unwrap();
    let speech = repos.schedules.for_event(event.id).await.unwrap()[0].clone();
    let speaker = repos.guests.upsert_speaker(10, "Dan").await.unwrap();
    repos.schedules.set_speaker(speech.id, speaker.id).await.unwrap();
    repos.guests.upsert(&profile(20, "Eve", false)).await.unwrap();

    let q = repos.questions.create(speech.id, 20, "Why Rust?").await.unwrap();
    assert!(q.guest_id.is_some());
    let anon = repos.questions.create(speech.id, 30, "And tests?").await.unwrap();
    assert!(anon.guest_id.is_none());

    let inbox = repos.questions.for_speaker(10, 10).await.unwrap();
    assert_eq!(inbox.len(), 2);
    assert!(inbox.iter().any(|q| q.asker_name.as_deref() == Some("Eve")));
    assert_eq!(repos.questions.for_schedule(speech.id).await.unwrap().len(), 2);
}

#[sqlx::test]
#[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
async fn donation_is_recorded_once_per_charge(pool: PgPool) {
    let repos = Repositories::new(pool);
    let event = repos.events.create_with_template("A", date(1)).await.unwrap();
    let donation = NewDonation {
        amount: 500,
        currency: "RUB",
        donor_tg_id: 42,
        event_id: Some(event.id),
        charge_id: "charge-1",
    };

    assert!(repos.donations.record(&donation).await.unwrap().is_some());
    assert!(repos.donations.record(&donation).await.unwrap().is_none());

    let report = repos.donations.report_for_event(event.id).await.unwrap();
    assert_eq!(report.count, 1);
    assert_eq!(report.total, 500);
}

#[sqlx::test]
#[ignore = "needs DATABASE_URL pointing at PostgreSQL"]
async fn contacts_and_attendees(pool: PgPool) {
    let repos = Repositories::new(pool);
    repos.guests.upsert(&profile(1, "Open", true)).await.unwrap();
    repos.guests.upsert(&profile(2, "Closed", false)).await.unwrap();
    repos.guests.upsert(&profile(3, "Me", true)).await.unwrap();

    let contacts = repos.guests.contacts(3, 5).await.unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].name, "Open");

    let event = repos.events.create_with_template("A", date(1)).await.unwrap();
    repos.events.add_attendee(event.id, 99).await.unwrap();
    repos.events.add_attendee(event.id, 99).await.unwrap();
    assert_eq!(repos.events.attendee_ids(event.id).await.unwrap(), vec![99]);

    let mut known = repos.guests.all_tg_ids().await.unwrap();
    known.sort();
    assert_eq!(known, vec![1, 2, 3, 99]);
}
