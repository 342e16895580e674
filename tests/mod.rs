mod sheet_source_mock;

// This file organizes the integration tests into a cohesive test suite.
// Each module tests a specific aspect of the application:
// - smoke_tests: config defaults, component wiring and the JSON API
// - sheet_source_mock: photo schedule refreshes against a mocked sheet source
// - rss_proxy_tests: the RSS relay against a local upstream server
