pub mod rtcp_bye;
pub mod rtcp_header;
pub mod rtcp_packet;
pub mod rtcp_receiver_report;
pub mod rtcp_rr;
pub mod rtcp_sdes;
pub mod rtcp_sender_report;
pub mod rtcp_sr;
