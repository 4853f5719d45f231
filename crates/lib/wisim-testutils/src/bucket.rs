use wisim_core::bucket::{Bucket, TimeMS};

#[derive(Default, Clone)]
pub struct TBucket {
    pub step: TimeMS,
    pub flush_count: u32,
}

impl TBucket {
    pub fn new() -> Self {
        Self {
            step: TimeMS::default(),
            flush_count: 0,
        }
    }
}

impl Bucket for TBucket {
    fn initialize(&mut self, step: TimeMS) {
        self.step = step;
    }

    fn before_agents(&mut self, step: TimeMS) {
        self.step = step;
    }

    fn after_agents(&mut self) {}

    fn stream_output(&mut self) {
        self.flush_count += 1;
    }

    fn terminate(self) {
        println!("TBucket terminated at {}", self.step);
    }
}
