//! Integration tests for vdmove-api
//!
//! Uses wiremock to simulate the Yandex Disk REST API and verifies
//! end-to-end behavior of the ApiClient, paginated listing, folder
//! creation, moves and asynchronous operation polling.


mod test_listing;
mod test_operations;
mod test_transfer;
