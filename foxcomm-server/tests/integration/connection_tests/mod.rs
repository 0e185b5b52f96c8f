mod test_stalled_member_is_dropped;
