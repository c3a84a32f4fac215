pub mod donation_repo;
pub mod event_repo;
pub mod guest_repo;
pub mod question_repo;
pub mod schedule_repo;

use sqlx::PgPool;

pub use donation_repo::DonationRepository;
pub use event_repo::EventRepository;
pub use guest_repo::GuestRepository;
pub use question_repo::QuestionRepository;
pub use schedule_repo::ScheduleRepository;

#[derive(Debug, Clone)]
pub struct Repositories {
    pub guests: GuestRepository,
    pub events: EventRepository,
    pub schedules: ScheduleRepository,
    pub questions: QuestionRepository,
    pub donations: DonationRepository,
}

impl Repositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            guests: GuestRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            schedules: ScheduleRepository::new(pool.clone()),
            questions: QuestionRepository::new(pool.clone()),
            donations: DonationRepository::new(pool),
        }
    }
}
