mod loopdev_tests;
mod sparse_tests;
mod usage_tests;
mod volume_tests;
