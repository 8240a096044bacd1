pub(crate) trait GetYear {
    fn get_year(&self) -> i32;
}
