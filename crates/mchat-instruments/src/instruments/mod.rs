pub mod mchat_r;
