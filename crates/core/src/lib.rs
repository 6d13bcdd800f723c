pub mod annotation {
    pub mod domain {
        pub mod frame_annotator;
    }
    pub mod infrastructure;
}

pub mod detection {
    pub mod domain {
        pub mod path_detector;
        pub mod path_estimate;
    }
    pub mod infrastructure;
}

pub mod guidance {
    pub mod domain {
        pub mod drive_command;
        pub mod steering_policy;
    }
}

pub mod pipeline {
    pub mod monitor_session;
    pub mod pipeline_logger;
}

pub mod shared {
    pub mod constants;
    pub mod frame;
}

pub mod video {
    pub mod domain {
        pub mod image_writer;
        pub mod stream_source;
    }
    pub mod infrastructure;
}
