//! A compact ATC resource bundle: enough of the category table, preposition list, filter and
//! complex rules to parse tower/approach phraseology like
//! `"Southwest 578 cleared to Atlanta via radar vectors …"` end to end.
//!
//! The resources follow the grammar expected by [SemanticParser::new]: the regex table maps
//! surface phrases to categories, the complex rules extend single placeholders with the
//! argument structure that the grammar composes, and the filter narrows the rule set used by
//! refinement passes.

use crate::{ResourceError, SemanticParser};

pub const REGEX_TABLE: &str = r#"
#ACKNOWLEDGE
r"\broger\b"
r"\bwilco\b"

#AFTER
r"\bafter\b"

#AIRCRAFT
r"\bsouthwest\b"
r"\bdelta\b"
r"\bunited\b"

#ALTITUDECHANGE
r"\bclimb\s+and\s+maintain\b"
r"\bdescend\s+and\s+maintain\b"

#CALLSIGN
r"\bswa\d+\b"
r"\bcallsign\b"

#CLEARED
r"\bcleared\b"

#CONTEXT
r"\bcontext\b"

#DEPARTURE
r"\bdeparture\b"

#DIRECTION
r"\bdirect\b"

#EXPECT
r"\bexpect\b"

#FIX
r"\bcrg\b"

#FREQUENCY
r"\bfrequency\b"

#INTNUMBER
r"\b\d+\b"

#LAND
r"\bland\b"

#PLACE
r"\batlanta\b"
r"\bmemphis\b"

#RADAR
r"\bradar\s+vectors\b"
r"\bradar\b"

#REALNUMBER
r"\b\d+\.\d+\b"

#ROUTE
r"\bv\d+\b"

#RUNWAY
r"\brunway\b"
r"\b\d{1,2}[lrc]\b"

#SQUAWK
r"\bsquawk\b"

#THEN
r"\bthen\b"

#TIME
r"\btime\b"

#TIMEMINSEC
r"\bminutes\b"
r"\bminute\b"

#TO
r"\bto\b"

#TRAFFIC
r"\btraffic\b"

#VIA
r"\bvia\b"

#WORDNUMBER
r"\bten\b"
r"\btwenty\b"
"#;

pub const PREPOSITIONS: &str = "\
to
the
is
at
be
being
for
has
of
on
through
will
with
via
in
your
underneath
this
that
it
as
over
into
an
are
if
out
then
up
now
or
my
when
have
";

/// Categories whose complex rules stay active in refinement passes. Rules not mentioning one
/// of these as a slash argument only fire on stage 0.
pub const CATEGORY_FILTERS: &str = "\
AFTER
TIME
TO
VIA
-ROUTE
";

pub const LEX_COMPLEX: &str = r#"
#AIRCRAFT
CALLSIGN/INTNUMBER {\\x._CALLSIGN_(_AIRCRAFT_(aircraft1),x)}

#AFTER
AFTER/DEPARTURE {\\x._AFTER_(_AFTER_(after1),x)}

#ALTITUDECHANGE
ALTITUDECHANGE/INTNUMBER {\\x._ALTITUDECHANGE_(_ALTITUDECHANGE_(altitudechange1),x)}

#CLEARED
(CLEARED/PLACE)/TO {\\x y._CLEARED_(_CLEARED_(cleared1),x,y)}
(CLEARED/RADAR)/VIA {\\x y._CLEARED_(_CLEARED_(cleared1),x,y)}
((CLEARED/RUNWAY)/LAND)/TO {\\x y z._CLEARED_(_CLEARED_(cleared1),x,y,z)}
-(CLEARED/FREQUENCY)/ON {\\x y._CLEARED_(_CLEARED_(cleared1),x,y)}

#DEPARTURE
DEPARTURE/FREQUENCY {\\x._DEPARTURE_(_DEPARTURE_(departure1),x)}

#EXPECT
EXPECT/INTNUMBER {\\x._EXPECT_(_EXPECT_(expect1),x)}
EXPECT/TIME {\\x._EXPECT_(_EXPECT_(expect1),x)}

#FREQUENCY
FREQUENCY/REALNUMBER {\\x._FREQUENCY_(_FREQUENCY_(frequency1),x)}

#ROUTE
(ROUTE/FIX)/TO {\\x y._ROUTE_(_ROUTE_(route1),x,y)}

#RUNWAY
RUNWAY/RUNWAY {\\x._RUNWAY_(_RUNWAY_(runway1),x)}

#SQUAWK
SQUAWK/INTNUMBER {\\x._SQUAWK_(_SQUAWK_(squawk1),x)}

#THEN
THEN/ROUTE {\\x._THEN_(_THEN_(then1),x)}
THEN/DIRECTION {\\x._THEN_(_THEN_(then1),x)}

#TIME
TIME/AFTER {\\x._TIME_(_TIME_(time1),x)}

#TRAFFIC
NP {_TRAFFIC_(traffic1)}

#WORDNUMBER
TIME/TIMEMINSEC {\\x._TIME_(_WORDNUMBER_(wordnumber1),x)}
"#;

/// Build the full pipeline over the bundled resources.
pub fn atc_parser() -> Result<SemanticParser, ResourceError> {
    SemanticParser::new(REGEX_TABLE, PREPOSITIONS, CATEGORY_FILTERS, LEX_COMPLEX)
}
