mod api_keys;
mod tasks;
