mod projection_scenarios;
mod proptests;
