use revassign_service::ReviewService;

pub struct AppState {
    pub service: ReviewService,
}

impl AppState {
    #[must_use]
    pub const fn new(service: ReviewService) -> Self {
        Self { service }
    }
}
