// Wire types for the outgoing message envelope.
pub mod dispatch {
    pub mod wire {
        pub mod v1 {
            include!("dispatch.wire.v1.rs");
        }
    }
}
