pub mod signout; // GET /api/signout - end the current session
